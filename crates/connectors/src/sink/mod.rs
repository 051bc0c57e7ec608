pub mod error;
pub mod gzip;
pub mod local;

use crate::sink::{error::SinkError, gzip::GzipFileSink, local::LocalFileSink};
use async_trait::async_trait;
use model::execution::modes::{CompressMode, EncryptionMode, FileFormat};
use std::path::PathBuf;
use tracing::debug;

/// Byte destination for one export worker.
#[async_trait]
pub trait ExportSink: Send {
    async fn write(&mut self, buf: &[u8]) -> Result<(), SinkError>;

    /// Flushes and releases the underlying stream. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<(), SinkError>;

    fn describe(&self) -> String;
}

/// Opens one sink per (table, part) pair.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn open(&self, table: &str, part: usize) -> Result<Box<dyn ExportSink>, SinkError>;
}

/// Writes `<dir>/<prefix><table>_<part>` files, gzip-compressed on request.
#[derive(Debug, Clone)]
pub struct LocalSinkFactory {
    dir: PathBuf,
    prefix: String,
    compress: CompressMode,
    encryption: EncryptionMode,
    file_format: FileFormat,
}

impl LocalSinkFactory {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            compress: CompressMode::None,
            encryption: EncryptionMode::None,
            file_format: FileFormat::None,
        }
    }

    pub fn with_compression(mut self, compress: CompressMode) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_encryption(mut self, encryption: EncryptionMode) -> Self {
        self.encryption = encryption;
        self
    }

    pub fn with_file_format(mut self, file_format: FileFormat) -> Self {
        self.file_format = file_format;
        self
    }

    pub fn file_path(&self, table: &str, part: usize) -> PathBuf {
        let mut name = format!("{}{}_{}", self.prefix, table, part);
        if self.compress == CompressMode::Gzip {
            name.push_str(".gz");
        }
        self.dir.join(name)
    }
}

#[async_trait]
impl SinkFactory for LocalSinkFactory {
    async fn open(&self, table: &str, part: usize) -> Result<Box<dyn ExportSink>, SinkError> {
        if self.encryption != EncryptionMode::None {
            return Err(SinkError::UnsupportedCodec(format!(
                "encryption {:?}",
                self.encryption
            )));
        }
        if self.file_format != FileFormat::None {
            return Err(SinkError::UnsupportedCodec(format!(
                "file format {:?}",
                self.file_format
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.file_path(table, part);
        debug!(path = %path.display(), "Opening export sink");

        match self.compress {
            CompressMode::None => Ok(Box::new(LocalFileSink::create(path).await?)),
            CompressMode::Gzip => Ok(Box::new(GzipFileSink::create(path).await?)),
        }
    }
}
