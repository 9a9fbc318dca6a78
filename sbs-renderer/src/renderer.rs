//! Renderer facade
//!
//! [`SbsRenderer`] bundles the engine with the asset settings needed to produce standalone
//! pages. It holds no per-render state and can be shared across threads.

use crate::document::DocumentShell;
use crate::engine::{EngineOptions, MarkdownEngine};
use crate::env::RenderEnvironment;
use crate::error::RenderError;
use tracing::error;

pub const DEFAULT_WIDGETS_DIR: &str = "./widgets";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_TITLE: &str = "SBS Document";
pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererOptions {
    /// Base path of the widget assets. A trailing `/` is ignored.
    pub widgets_dir: String,
    /// Theme stylesheet name under `{widgets_dir}/themes/`. Empty means `default`.
    pub theme: String,
    /// `lang` of the assembled `<html>` element.
    pub lang: String,
    pub engine: EngineOptions,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            widgets_dir: DEFAULT_WIDGETS_DIR.to_string(),
            theme: DEFAULT_THEME.to_string(),
            lang: DEFAULT_LANG.to_string(),
            engine: EngineOptions::default(),
        }
    }
}

pub struct SbsRenderer {
    widgets_dir: String,
    theme: String,
    lang: String,
    engine: MarkdownEngine,
}

impl SbsRenderer {
    pub fn new() -> Self {
        Self::with_options(RendererOptions::default())
    }

    pub fn with_options(options: RendererOptions) -> Self {
        let theme = match options.theme.trim() {
            "" => DEFAULT_THEME.to_string(),
            theme => theme.to_string(),
        };
        Self {
            widgets_dir: options.widgets_dir.trim_end_matches('/').to_string(),
            theme,
            lang: options.lang,
            engine: MarkdownEngine::with_sbs_extensions(options.engine),
        }
    }

    pub fn widgets_dir(&self) -> &str {
        &self.widgets_dir
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn engine(&self) -> &MarkdownEngine {
        &self.engine
    }

    /// Render to an HTML fragment with a throwaway environment.
    pub fn render(&self, text: &str) -> String {
        self.render_with(text, &mut RenderEnvironment::new())
            .unwrap_or_else(|err| {
                error!(%err, "render failed");
                String::new()
            })
    }

    /// Render to an HTML fragment, recording asset usage in `env`.
    pub fn render_with(
        &self,
        text: &str,
        env: &mut RenderEnvironment,
    ) -> Result<String, RenderError> {
        self.engine.render(text, env)
    }

    /// Render a complete page, declaring only the assets the content uses.
    pub fn try_render_document(&self, text: &str, title: &str) -> Result<String, RenderError> {
        let mut env = RenderEnvironment::new();
        let body = self.render_with(text, &mut env)?;
        let shell = DocumentShell {
            lang: &self.lang,
            title,
            widgets_dir: &self.widgets_dir,
            theme: &self.theme,
        };
        Ok(shell.assemble(&body, &env))
    }

    pub fn render_document(&self, text: &str, title: &str) -> String {
        self.try_render_document(text, title)
            .unwrap_or_else(|err| {
                error!(%err, "document render failed");
                String::new()
            })
    }
}

impl Default for SbsRenderer {
    fn default() -> Self {
        Self::new()
    }
}
