//! Error types for render operations

use thiserror::Error;

/// Errors that can surface from a render call.
///
/// Malformed fence configuration, missing payloads and invalid image attributes are
/// recovered locally and never show up here.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The environment handed to a render was already consumed by an earlier render.
    #[error("render environment was already consumed by a previous render")]
    EnvironmentReused,
    /// Comrak failed to write the HTML output
    #[error("failed to write HTML output: {0}")]
    Output(#[from] std::io::Error),
    /// The HTML writer produced bytes that are not UTF-8
    #[error("rendered HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
