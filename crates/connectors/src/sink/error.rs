use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported output codec: {0}")]
    UnsupportedCodec(String),

    #[error("Sink already closed: {0}")]
    Closed(String),
}
