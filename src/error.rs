//! Error types for git-big

use thiserror::Error;

/// Errors raised by the caller-facing entry points.
///
/// Layout and normalization never fail; malformed activity data degrades to
/// zero activity instead of surfacing here.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid GITBIG_END_DATE value: {0}")]
    InvalidEndDate(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid theme: {0} (expected dark or light)")]
    InvalidTheme(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Failed to parse activity input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
