use std::string::FromUtf8Error;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any MySQL driver error, including pool and URL errors.
    #[error("SQL error: {0}")]
    Sql(#[from] mysql_async::Error),

    /// UTF-8 decoding failed on some byte data.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Could not obtain a connection for the given target.
    #[error("Connection to '{target}' failed: {message}")]
    Connect { target: String, message: String },

    /// The server rejected a statement.
    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
