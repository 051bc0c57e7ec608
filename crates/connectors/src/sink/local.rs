use crate::sink::{ExportSink, error::SinkError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};

/// Plain file on local disk.
pub struct LocalFileSink {
    path: PathBuf,
    file: Option<File>,
}

impl LocalFileSink {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }
}

#[async_trait]
impl ExportSink for LocalFileSink {
    async fn write(&mut self, buf: &[u8]) -> Result<(), SinkError> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_all(buf).await?),
            None => Err(SinkError::Closed(self.describe())),
        }
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
