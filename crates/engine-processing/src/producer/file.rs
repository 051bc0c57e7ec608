use crate::{
    error::ProducerError,
    producer::{DataProducer, emitter::BatchEmitter},
};
use connectors::file::reader::{ReaderOptions, RecordReader, open_reader};
use engine_core::{buffer::BatchPublisher, context::producer::ProducerContext, metrics::FileReaderStat};
use std::{path::PathBuf, time::Instant};
use tracing::{debug, info};

/// Reads a group of source files. Each file is its own source: its batches
/// carry the file's source index and a block index restarting at zero.
pub struct FileReader {
    name: String,
    ctx: ProducerContext,
    files: Vec<(usize, PathBuf)>,
    readers: Vec<(usize, Box<dyn RecordReader>)>,
    publisher: Option<BatchPublisher>,
}

impl FileReader {
    pub fn new(
        worker_index: usize,
        ctx: ProducerContext,
        files: Vec<(usize, PathBuf)>,
        publisher: BatchPublisher,
    ) -> Self {
        Self {
            name: format!("{}-reader-{}", ctx.settings().table, worker_index),
            ctx,
            files,
            readers: Vec::new(),
            publisher: Some(publisher),
        }
    }

    fn read_source(
        &self,
        source_index: usize,
        reader: &mut dyn RecordReader,
        publisher: BatchPublisher,
    ) -> Result<u64, ProducerError> {
        let settings = self.ctx.settings();
        let started = Instant::now();
        let mut emitter = BatchEmitter::new(
            publisher,
            self.ctx.run().metrics().clone(),
            source_index,
            settings.batch_size,
        );

        if settings.with_header {
            if let Some(header) = reader.next_record()? {
                debug!(path = %reader.path().display(), header = %header, "Skipped header");
            }
        }

        let mut records = 0u64;
        while let Some(record) = reader.next_record()? {
            emitter.append(record)?;
            records += 1;
        }
        emitter.finish()?;

        let stat = FileReaderStat {
            source_index,
            path: reader.path().display().to_string(),
            lines: reader.lines_read(),
            records,
            elapsed: started.elapsed(),
        };
        info!(
            path = %stat.path,
            lines = stat.lines,
            records,
            blocks = emitter.blocks_emitted(),
            elapsed_ms = stat.elapsed.as_millis() as u64,
            "Finished reading file"
        );
        self.ctx.run().push_reader_stat(stat);
        Ok(records)
    }
}

impl DataProducer for FileReader {
    fn init(&mut self) -> Result<(), ProducerError> {
        let settings = self.ctx.settings();
        let options = ReaderOptions {
            separator: settings.separator.clone(),
            charset: settings.charset,
            max_multiline: settings.max_multiline,
        };

        for (source_index, path) in &self.files {
            let reader = open_reader(settings.format, path, &options)?;
            self.readers.push((*source_index, reader));
        }
        debug!(producer = %self.name, files = self.readers.len(), "Opened source files");
        Ok(())
    }

    fn read_data(&mut self) -> Result<u64, ProducerError> {
        let publisher = self
            .publisher
            .clone()
            .ok_or(ProducerError::ShutdownSignal)?;
        if self.readers.len() != self.files.len() {
            return Err(ProducerError::NotInitialized(self.name.clone()));
        }

        let mut readers = std::mem::take(&mut self.readers);
        let mut total = 0;
        for (source_index, reader) in readers.iter_mut() {
            total += self.read_source(*source_index, reader.as_mut(), publisher.clone())?;
        }
        Ok(total)
    }

    fn close(&mut self) {
        self.readers.clear();
        self.publisher = None;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
