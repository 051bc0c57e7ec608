use crate::{
    consumer::{insert::InsertConsumer, process_only::ProcessOnlyConsumer, sharded::ShardedInsertConsumer},
    error::ConsumerError,
};
use async_trait::async_trait;
use engine_core::{
    buffer::BatchClaimer,
    context::{consumer::ConsumerContext, run::RunState},
    sync::latch::LatchGuard,
};
use model::records::batch::RowBatch;
use std::sync::Arc;
use tracing::{debug, info};

pub mod insert;
pub mod process_only;
pub mod sharded;

#[async_trait]
pub trait DataConsumer: Send {
    /// Handles one claimed batch. An error fails this batch only.
    async fn consume(&mut self, batch: &RowBatch) -> Result<(), ConsumerError>;

    /// Flushes whatever is still buffered once the buffer reports end-of-stream.
    async fn finish(&mut self) -> Result<(), ConsumerError>;

    fn name(&self) -> &str;
}

/// Picks the consumer variant for a table run.
pub fn create_consumer(
    ctx: &ConsumerContext,
    worker_index: usize,
    process_only: bool,
) -> Result<Box<dyn DataConsumer>, ConsumerError> {
    if process_only {
        return Ok(Box::new(ProcessOnlyConsumer::new(ctx.clone(), worker_index)));
    }
    if ctx.is_sharded() {
        return Ok(Box::new(ShardedInsertConsumer::new(ctx.clone(), worker_index)?));
    }
    Ok(Box::new(InsertConsumer::new(ctx.clone(), worker_index)))
}

/// Drains the buffer until end-of-stream.
///
/// Batch failures are recorded in the run's error slot and draining goes on,
/// so producers never block on a full buffer and every claimed row is counted.
pub async fn run_consumer(
    mut consumer: Box<dyn DataConsumer>,
    claimer: BatchClaimer,
    run: Arc<RunState>,
    guard: LatchGuard,
) {
    let mut batches = 0u64;
    while let Some(batch) = claimer.claim().await {
        debug!(consumer = consumer.name(), tag = %batch.tag(), rows = batch.len(), "Claimed batch");
        if let Err(e) = consumer.consume(&batch).await {
            run.record_error(consumer.name(), e.into());
        }
        run.metrics().record_consumed(batch.len() as u64);
        batches += 1;
    }

    if let Err(e) = consumer.finish().await {
        run.record_error(consumer.name(), e.into());
    }
    info!(consumer = consumer.name(), batches, "Consumer finished");

    drop(claimer);
    drop(consumer);
    drop(guard);
}
