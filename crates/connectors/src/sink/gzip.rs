use crate::sink::{ExportSink, error::SinkError};
use async_trait::async_trait;
use flate2::{Compression, write::GzEncoder};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tokio::{fs::File, io::AsyncWriteExt};

/// Gzip-compressed file. Compressed bytes are staged in memory and handed to
/// the file after every write, so the staging buffer stays small.
pub struct GzipFileSink {
    path: PathBuf,
    encoder: Option<GzEncoder<Vec<u8>>>,
    file: Option<File>,
}

impl GzipFileSink {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            encoder: Some(GzEncoder::new(Vec::new(), Compression::default())),
            file: Some(file),
        })
    }
}

#[async_trait]
impl ExportSink for GzipFileSink {
    async fn write(&mut self, buf: &[u8]) -> Result<(), SinkError> {
        let (Some(encoder), Some(file)) = (self.encoder.as_mut(), self.file.as_mut()) else {
            return Err(SinkError::Closed(self.path.display().to_string()));
        };

        encoder.write_all(buf)?;
        let staged = std::mem::take(encoder.get_mut());
        if !staged.is_empty() {
            file.write_all(&staged).await?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        let (Some(encoder), Some(mut file)) = (self.encoder.take(), self.file.take()) else {
            return Ok(());
        };

        let tail = encoder.finish()?;
        file.write_all(&tail).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[tokio::test]
    async fn output_decompresses_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gz");

        let mut sink = GzipFileSink::create(&path).await.unwrap();
        for i in 0..100 {
            sink.write(format!("{i},row-{i}\n").as_bytes()).await.unwrap();
        }
        sink.close().await.unwrap();
        sink.close().await.unwrap();

        let compressed = std::fs::read(&path).unwrap();
        let mut text = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut text)
            .unwrap();

        assert_eq!(text.lines().count(), 100);
        assert!(text.starts_with("0,row-0\n"));
        assert!(text.ends_with("99,row-99\n"));
    }
}
