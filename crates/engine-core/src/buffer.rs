use crate::error::PipelineError;
use model::records::batch::RowBatch;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Creates the bounded batch buffer of one table run.
///
/// Every producer holds a [`BatchPublisher`] clone and every consumer a
/// [`BatchClaimer`] clone. `publish` waits while all `capacity` slots are
/// taken. `claim` hands each batch to exactly one consumer and yields `None`
/// once every publisher is dropped and the buffer is drained.
pub fn batch_buffer(capacity: usize) -> (BatchPublisher, BatchClaimer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        BatchPublisher { tx },
        BatchClaimer {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

#[derive(Debug, Clone)]
pub struct BatchPublisher {
    tx: mpsc::Sender<RowBatch>,
}

impl BatchPublisher {
    pub async fn publish(&self, batch: RowBatch) -> Result<(), PipelineError> {
        self.tx
            .send(batch)
            .await
            .map_err(|e| PipelineError::BufferClosed(e.0.tag()))
    }

    /// Blocking variant for producers running on a blocking thread. Must not
    /// be called from async context.
    pub fn publish_blocking(&self, batch: RowBatch) -> Result<(), PipelineError> {
        self.tx
            .blocking_send(batch)
            .map_err(|e| PipelineError::BufferClosed(e.0.tag()))
    }
}

#[derive(Debug, Clone)]
pub struct BatchClaimer {
    rx: Arc<Mutex<mpsc::Receiver<RowBatch>>>,
}

impl BatchClaimer {
    pub async fn claim(&self) -> Option<RowBatch> {
        self.rx.lock().await.recv().await
    }
}
