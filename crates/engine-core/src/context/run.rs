use crate::{
    error::PipelineError,
    metrics::{FileReaderStat, Metrics},
    sync::{
        latch::{CountDownLatch, LatchGuard},
        slot::FirstErrorSlot,
    },
};
use std::sync::{Arc, Mutex, PoisonError};

/// Mutable state shared by every worker of one table run: the completion
/// latch, the first-error slot and the row counters.
///
/// Built once per run and handed to both the producer and the consumer
/// context, so both sides observe the same counters and the same slot.
#[derive(Debug)]
pub struct RunState {
    latch: Arc<CountDownLatch>,
    errors: FirstErrorSlot,
    metrics: Metrics,
    reader_stats: Mutex<Vec<FileReaderStat>>,
}

impl RunState {
    /// `workers` is the number of workers that will each call [`RunState::checkout`] once.
    pub fn new(workers: usize, metrics: Metrics) -> Arc<Self> {
        Arc::new(Self {
            latch: Arc::new(CountDownLatch::new(workers)),
            errors: FirstErrorSlot::new(),
            metrics,
            reader_stats: Mutex::new(Vec::new()),
        })
    }

    /// Guard that releases this worker's latch slot when dropped.
    pub fn checkout(&self) -> LatchGuard {
        LatchGuard::new(self.latch.clone())
    }

    pub async fn wait(&self) {
        self.latch.wait().await
    }

    pub fn pending_workers(&self) -> usize {
        self.latch.count()
    }

    pub fn record_error(&self, worker: &str, err: PipelineError) -> bool {
        self.metrics.increment_failures(1);
        self.errors.record(worker, err)
    }

    pub fn has_failed(&self) -> bool {
        self.errors.is_set()
    }

    pub fn take_error(&self) -> Option<PipelineError> {
        self.errors.take()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn push_reader_stat(&self, stat: FileReaderStat) {
        self.reader_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stat);
    }

    pub fn reader_stats(&self) -> Vec<FileReaderStat> {
        let mut stats = self
            .reader_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        stats.sort_by_key(|s| s.source_index);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkouts_release_the_run() {
        let run = RunState::new(2, Metrics::new());
        let a = run.checkout();
        let b = run.checkout();
        assert_eq!(run.pending_workers(), 2);

        drop(a);
        run.record_error(
            "consumer-0",
            PipelineError::Configuration("bad".into()),
        );
        drop(b);

        run.wait().await;
        assert!(run.has_failed());
        assert_eq!(run.metrics().snapshot().failure_count, 1);
        assert!(matches!(
            run.take_error(),
            Some(PipelineError::Configuration(_))
        ));
    }
}
