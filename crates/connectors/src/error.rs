use crate::{file::error::FileError, sink::error::SinkError, sql::error::DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Failed to build a connection source.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// File-related error.
    #[error("File error: {0}")]
    FileError(#[from] FileError),

    /// Sink-related error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Unsupported driver error.
    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// Missing required property error.
    #[error("Missing required property: {0}")]
    MissingProperty(String),
}
