use crate::execution::ddl::DdlError;
use connectors::{error::AdapterError, sql::error::DbError};
use engine_config::{error::ConfigError, report::summary::RunSummary};
use engine_core::error::PipelineError;
use engine_processing::error::{ConsumerError, ExportError};
use thiserror::Error;

/// Top-level errors of an import, export or DDL run.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Adapter-related error.
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Db error.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("DDL error: {0}")]
    Ddl(#[from] DdlError),

    /// First error captured by the workers of a table run.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Consumer setup failed: {0}")]
    Consumer(#[from] ConsumerError),

    #[error("Export setup failed: {0}")]
    Export(#[from] ExportError),

    #[error("Table '{0}' does not exist on the target")]
    MissingTable(String),

    #[error("No source files found for table '{0}'")]
    NoSourceFiles(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while joining a task.
    /// This usually indicates that the task was cancelled or panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// At least one table failed. Carries the summary of every table that ran
    /// and the first failure.
    #[error("Run failed: {source}")]
    Failed {
        summary: Box<RunSummary>,
        #[source]
        source: Box<TransferError>,
    },
}

impl TransferError {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            TransferError::Failed { summary, .. } => Some(summary),
            _ => None,
        }
    }
}
