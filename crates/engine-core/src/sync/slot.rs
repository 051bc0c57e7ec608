use crate::error::PipelineError;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, warn};

/// Holds the first error reported by any worker of a run. Later errors are
/// logged and discarded.
#[derive(Debug, Default)]
pub struct FirstErrorSlot {
    claimed: AtomicBool,
    error: Mutex<Option<PipelineError>>,
}

impl FirstErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `err` became the run's error.
    pub fn record(&self, worker: &str, err: PipelineError) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            error!(worker, error = %err, "Worker failed");
            *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
            true
        } else {
            warn!(worker, error = %err, "Dropping secondary failure");
            false
        }
    }

    pub fn is_set(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn take(&self) -> Option<PipelineError> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
