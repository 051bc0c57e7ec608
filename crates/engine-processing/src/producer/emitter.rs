use crate::error::ProducerError;
use engine_core::{buffer::BatchPublisher, metrics::Metrics};
use model::records::batch::RowBatch;

/// Groups records of one source into fixed-size batches and publishes them
/// in block order.
pub struct BatchEmitter {
    publisher: BatchPublisher,
    metrics: Metrics,
    source_index: usize,
    batch_size: usize,
    next_block: u64,
    current: RowBatch,
}

impl BatchEmitter {
    pub fn new(
        publisher: BatchPublisher,
        metrics: Metrics,
        source_index: usize,
        batch_size: usize,
    ) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            publisher,
            metrics,
            source_index,
            batch_size,
            next_block: 0,
            current: RowBatch::with_capacity(batch_size),
        }
    }

    pub fn append(&mut self, record: String) -> Result<(), ProducerError> {
        if self.current.push(record) {
            self.emit()?;
        }
        Ok(())
    }

    /// Publishes the partial tail batch, if any.
    pub fn finish(&mut self) -> Result<(), ProducerError> {
        if !self.current.is_empty() {
            self.emit()?;
        }
        Ok(())
    }

    pub fn blocks_emitted(&self) -> u64 {
        self.next_block
    }

    fn emit(&mut self) -> Result<(), ProducerError> {
        let mut batch =
            std::mem::replace(&mut self.current, RowBatch::with_capacity(self.batch_size));
        batch.seal(self.source_index, self.next_block);
        self.next_block += 1;

        let rows = batch.len() as u64;
        self.publisher
            .publish_blocking(batch)
            .map_err(|e| ProducerError::ChannelSend(e.to_string()))?;
        self.metrics.record_emitted(rows);
        Ok(())
    }
}
