use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Quoted CSV readers split on a single byte.
    #[error("CSV reader only supports a one-character separator, got '{0}'")]
    InvalidSeparator(String),

    #[error("Logical line starting at {path}:{line} spans {span} lines (max {max})")]
    LineTooLong {
        path: PathBuf,
        line: u64,
        span: u64,
        max: usize,
    },

    #[error("Undecodable bytes at {path}:{line}")]
    Encoding { path: PathBuf, line: u64 },
}

impl FileError {
    /// Maps an `open` failure onto the error kinds callers distinguish.
    pub fn from_open(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path),
            _ => FileError::IoError(err),
        }
    }
}
