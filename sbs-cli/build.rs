use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() in src/main.rs
// Build scripts can't access src/ modules
fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("sbs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render SBS Markdown to HTML")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-widgets")
                .long("list-widgets")
                .help("List recognized widget fences, containers and image attributes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an sbs.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log rendering decisions to stderr")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("render")
                .about("Render a Markdown file to HTML (default command)")
                .arg(
                    Arg::new("source")
                        .help("Markdown source file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("widgets-dir")
                        .long("widgets-dir")
                        .help("Base path of the widget assets")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(Arg::new("theme").long("theme").help("Theme name under <widgets-dir>/themes"))
                .arg(Arg::new("title").long("title").help("Document title"))
                .arg(Arg::new("lang").long("lang").help("lang attribute of the <html> element"))
                .arg(
                    Arg::new("fragment")
                        .long("fragment")
                        .help("Emit the HTML fragment without the document shell")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("tables")
                        .long("tables")
                        .help("Enable GFM pipe tables")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("strikethrough")
                        .long("strikethrough")
                        .help("Enable GFM strikethrough")
                        .action(ArgAction::SetTrue),
                ),
        );

    generate_to(Bash, &mut cmd, "sbs", &outdir)?;
    generate_to(Zsh, &mut cmd, "sbs", &outdir)?;
    generate_to(Fish, &mut cmd, "sbs", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
