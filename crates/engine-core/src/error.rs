use connectors::{file::error::FileError, sink::error::SinkError, sql::error::DbError};
use model::{records::batch::BatchTag, topology::rule::RuleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No topology registered for table '{0}'")]
    UnknownTable(String),

    #[error("Table '{0}' has no partition rule")]
    NotPartitioned(String),

    #[error("Row of '{table}' has no field at partition position {column}")]
    MissingKey { table: String, column: usize },

    #[error("Cannot route row of '{table}': {source}")]
    Rule {
        table: String,
        #[source]
        source: RuleError,
    },
}

/// Failure captured by a pipeline worker. The first one recorded for a run is
/// the one the driver re-raises.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Execution failed on {target}: {source}")]
    Execution {
        target: String,
        #[source]
        source: DbError,
    },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Batch buffer closed before {0} was delivered")]
    BufferClosed(BatchTag),

    #[error("Worker {worker} failed: {message}")]
    Worker { worker: String, message: String },
}
