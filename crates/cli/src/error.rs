use connectors::{error::AdapterError, sql::error::DbError};
use engine_config::error::ConfigError;
use engine_runtime::error::TransferError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to write the summary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid job file: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open a connection source: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Connection test failed: {0}")]
    Database(#[from] DbError),

    #[error("Run failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
