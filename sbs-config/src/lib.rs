//! Shared configuration loader for the sbs toolchain.
//!
//! `defaults/sbs.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`SbsConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use sbs_renderer::{EngineOptions, RendererOptions};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/sbs.default.toml");

/// Name of the project-level configuration file picked up from the working directory.
pub const PROJECT_CONFIG_FILE: &str = "sbs.toml";

/// Top-level configuration consumed by sbs applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SbsConfig {
    pub render: RenderConfig,
    pub markdown: MarkdownConfig,
}

/// Asset locations and document shell settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub widgets_dir: String,
    pub theme: String,
    pub title: String,
    pub lang: String,
}

/// CommonMark extensions of the underlying parser.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarkdownConfig {
    pub autolink: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl From<MarkdownConfig> for EngineOptions {
    fn from(config: MarkdownConfig) -> Self {
        EngineOptions {
            autolink: config.autolink,
            tables: config.tables,
            strikethrough: config.strikethrough,
        }
    }
}

impl From<&SbsConfig> for RendererOptions {
    fn from(config: &SbsConfig) -> Self {
        RendererOptions {
            widgets_dir: config.render.widgets_dir.clone(),
            theme: config.render.theme.clone(),
            lang: config.render.lang.clone(),
            engine: config.markdown.into(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<SbsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SbsConfig, ConfigError> {
    Loader::new().build()
}
