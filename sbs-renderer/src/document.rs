//! Standalone document assembly
//!
//! Wraps a rendered fragment in a full HTML page whose head declares only the assets the
//! fragment needs:
//!
//! - `{widgets}/sbs-ext.css` and `{widgets}/themes/{theme}.css`, always
//! - `{widgets}/{kind}/index.js` for each widget kind used (bridge, chess, go order)
//! - `{widgets}/image-attrs.js` when an image was scaled

use crate::env::RenderEnvironment;
use html_escape::{encode_single_quoted_attribute, encode_text};

/// Page-level settings of an assembled document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentShell<'a> {
    pub lang: &'a str,
    pub title: &'a str,
    pub widgets_dir: &'a str,
    pub theme: &'a str,
}

impl DocumentShell<'_> {
    pub fn stylesheet_hrefs(&self) -> Vec<String> {
        vec![
            format!("{}/sbs-ext.css", self.widgets_dir),
            format!("{}/themes/{}.css", self.widgets_dir, self.theme),
        ]
    }

    pub fn script_srcs(&self, env: &RenderEnvironment) -> Vec<String> {
        let mut srcs: Vec<String> = env
            .used_widgets()
            .map(|kind| format!("{}/{}/index.js", self.widgets_dir, kind.name()))
            .collect();
        if env.uses_image_scale() {
            srcs.push(format!("{}/image-attrs.js", self.widgets_dir));
        }
        srcs
    }

    /// Wrap `body` in a complete HTML document.
    pub fn assemble(&self, body: &str, env: &RenderEnvironment) -> String {
        let mut head = vec![
            "<meta charset='utf-8'>".to_string(),
            "<meta name='viewport' content='width=device-width, initial-scale=1'>".to_string(),
            format!("<title>{}</title>", encode_text(self.title)),
        ];
        head.extend(self.stylesheet_hrefs().iter().map(|href| {
            format!(
                "<link rel='stylesheet' href='{}'>",
                encode_single_quoted_attribute(href)
            )
        }));
        head.extend(self.script_srcs(env).iter().map(|src| {
            format!(
                "<script type='module' src='{}'></script>",
                encode_single_quoted_attribute(src)
            )
        }));

        format!(
            "<!DOCTYPE html>\n<html lang='{}'>\n<head>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
            encode_single_quoted_attribute(self.lang),
            head.join("\n"),
            body.trim_end_matches('\n')
        )
    }
}
