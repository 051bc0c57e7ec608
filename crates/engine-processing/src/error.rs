use connectors::{file::error::FileError, sink::error::SinkError, sql::error::DbError};
use engine_core::error::{PipelineError, ResolutionError};
use model::records::batch::BatchTag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Source file error: {0}")]
    File(#[from] FileError),

    #[error("Producer used before init: {0}")]
    NotInitialized(String),

    #[error("Failed to send batch: {0}")]
    ChannelSend(String),

    #[error("The consumer channel was closed unexpectedly.")]
    ShutdownSignal,
}

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Malformed record in batch {tag} of '{table}': {message}")]
    Parse {
        table: String,
        tag: BatchTag,
        message: String,
    },

    #[error("Routing failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Cannot connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: DbError,
    },

    #[error("INSERT into {target} failed: {source}")]
    Execute {
        target: String,
        #[source]
        source: DbError,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: DbError,
    },

    #[error("Export query on {target} failed: {source}")]
    Query {
        target: String,
        #[source]
        source: DbError,
    },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Unknown mask column: {0}")]
    UnknownMaskColumn(String),

    #[error("Unknown export column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },
}

impl From<ProducerError> for PipelineError {
    fn from(err: ProducerError) -> Self {
        match err {
            ProducerError::File(e) => PipelineError::File(e),
            other => PipelineError::Worker {
                worker: "producer".to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<ConsumerError> for PipelineError {
    fn from(err: ConsumerError) -> Self {
        match err {
            ConsumerError::Parse {
                table,
                tag,
                message,
            } => PipelineError::Parse {
                context: format!("{table} {tag}"),
                message,
            },
            ConsumerError::Resolution(e) => PipelineError::Resolution(e),
            ConsumerError::Connect { target, source } | ConsumerError::Execute { target, source } => {
                PipelineError::Execution { target, source }
            }
        }
    }
}

impl From<ExportError> for PipelineError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Connect { target, source } | ExportError::Query { target, source } => {
                PipelineError::Execution { target, source }
            }
            ExportError::Sink(e) => PipelineError::Sink(e),
            other => PipelineError::Configuration(other.to_string()),
        }
    }
}
