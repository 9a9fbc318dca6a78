// Command-line interface for sbs
//
// Renders SBS Markdown (CommonMark plus chess, bridge and go widget fences, sticky containers
// and image display attributes) to HTML.
//
// Usage:
//  sbs <source> [-o <file>] [--widgets-dir <dir>] [--theme <name>] [--title <title>]  - Render (default)
//  sbs render <source> [...]                        - Same as above (explicit)
//  sbs render <source> --fragment                   - Body markup only, no document shell
//  sbs --list-widgets                               - List fences, containers and image attributes
//
// Configuration:
//
// Built-in defaults (sbs-config) are layered with ./sbs.toml, then --config <file>, then the
// flags given to the render command. Output goes to stdout unless -o is given.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use sbs_config::{ConfigError, Loader, SbsConfig, PROJECT_CONFIG_FILE};
use sbs_renderer::{RenderEnvironment, RendererOptions, SbsRenderer, WidgetKind};
use std::fs;
use tracing::Level;

const SUBCOMMANDS: &[&str] = &["render", "help"];

/// Render flags that map onto configuration keys: (flag, key)
const RENDER_OVERRIDES: &[(&str, &str)] = &[
    ("widgets-dir", "render.widgets_dir"),
    ("theme", "render.theme"),
    ("title", "render.title"),
    ("lang", "render.lang"),
];

const MARKDOWN_OVERRIDES: &[(&str, &str)] = &[
    ("tables", "markdown.tables"),
    ("strikethrough", "markdown.strikethrough"),
];

fn build_cli() -> Command {
    Command::new("sbs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render SBS Markdown to HTML")
        .long_about(
            "sbs renders SBS flavored Markdown to HTML pages.\n\n\
            Widget fences (sbs-chess, sbs-bridge, sbs-go) become custom elements that the\n\
            widget runtime draws in the browser. Standalone documents link only the runtime\n\
            scripts their content uses.\n\n\
            Examples:\n  \
            sbs game.md                          # Render a page to stdout\n  \
            sbs game.md -o game.html             # Render a page to a file\n  \
            sbs render game.md --fragment        # Body markup only\n  \
            sbs game.md --widgets-dir /static/widgets --theme dark",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-widgets")
                .long("list-widgets")
                .help("List recognized widget fences, containers and image attributes")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an sbs.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log rendering decisions to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
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
                        .value_name("DIR")
                        .help("Base path of the widget assets")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("theme")
                        .long("theme")
                        .value_name("NAME")
                        .help("Theme name under <widgets-dir>/themes"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Document title"),
                )
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .help("lang attribute of the <html> element"),
                )
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
        )
}

/// Parse `args`, treating a leading file argument as an implicit `render`.
fn parse_args(args: &[String]) -> Result<ArgMatches, clap::Error> {
    let cli = build_cli();
    match cli.clone().try_get_matches_from(args) {
        Ok(matches) => Ok(matches),
        Err(err) => {
            if args.len() > 1
                && !args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut injected = vec![args[0].clone(), "render".to_string()];
                injected.extend_from_slice(&args[1..]);
                cli.try_get_matches_from(&injected)
            } else {
                Err(err)
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let matches = parse_args(&args).unwrap_or_else(|err| err.exit());

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-widgets") {
        handle_list_widgets_command();
        return;
    }

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let config = load_cli_config(
                matches.get_one::<String>("config").map(|s| s.as_str()),
                sub_matches,
            )
            .unwrap_or_else(|err| {
                eprintln!("Failed to load configuration: {err}");
                std::process::exit(1);
            });
            let source = sub_matches
                .get_one::<String>("source")
                .expect("source is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_render_command(source, output, sub_matches.get_flag("fragment"), &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn load_cli_config(
    explicit_path: Option<&str>,
    render_matches: &ArgMatches,
) -> Result<SbsConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    if let Some(path) = explicit_path {
        loader = loader.with_file(path);
    }

    for (flag, key) in RENDER_OVERRIDES {
        if let Some(value) = render_matches.get_one::<String>(flag) {
            loader = loader.set_override(key, value.clone())?;
        }
    }
    for (flag, key) in MARKDOWN_OVERRIDES {
        if render_matches.get_flag(flag) {
            loader = loader.set_override(key, true)?;
        }
    }

    loader.build()
}

fn handle_render_command(
    source_path: &str,
    output: Option<&str>,
    fragment: bool,
    config: &SbsConfig,
) {
    let source = fs::read_to_string(source_path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{source_path}': {e}");
        std::process::exit(1);
    });

    let renderer = SbsRenderer::with_options(RendererOptions::from(config));
    let rendered = if fragment {
        renderer.render_with(&source, &mut RenderEnvironment::new())
    } else {
        renderer.try_render_document(&source, &config.render.title)
    };
    let html = rendered.unwrap_or_else(|e| {
        eprintln!("Render error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, html).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{html}"),
    }
}

fn handle_list_widgets_command() {
    let renderer = SbsRenderer::new();
    let registry = renderer.engine().registry();

    println!("Widget fences:");
    for kind in WidgetKind::ALL {
        println!(
            "  {:<12} <{}>  payload: {}",
            kind.tag(),
            kind.tag(),
            kind.mime_type()
        );
    }

    println!("\nContainers:");
    for name in registry.container_names() {
        println!("  ::: {name}");
    }

    println!("\nImage attributes:");
    println!("  {}", registry.image_attr_keys().join(", "));
}
