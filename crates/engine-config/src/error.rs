use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a job description. All of them
/// surface before any worker starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read job file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed job description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Illegal separator {0:?}: must be non-empty and free of CR, LF and '\"'")]
    IllegalSeparator(String),

    #[error("CSV format requires a single-character separator, got {0:?}")]
    SeparatorTooWide(String),

    #[error("Only one of compression, encryption and file format may be set (got {0})")]
    ConflictingOutputOptions(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
