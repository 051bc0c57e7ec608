use crate::error::ProducerError;
use engine_core::{context::run::RunState, sync::latch::LatchGuard};
use std::{fmt, sync::Arc};
use tracing::{debug, info};

pub mod benchmark;
pub mod emitter;
pub mod file;

/// A blocking batch source. Runs on a blocking thread and publishes into the
/// batch buffer as a side effect of [`DataProducer::read_data`].
pub trait DataProducer: Send {
    /// Opens the producer's inputs.
    fn init(&mut self) -> Result<(), ProducerError>;

    /// Reads every input to the end and returns the number of records emitted.
    fn read_data(&mut self) -> Result<u64, ProducerError>;

    /// Releases inputs and the producer's handle on the buffer. Idempotent.
    fn close(&mut self);

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Init,
    Running,
    Done,
    Failed,
}

impl fmt::Display for ProducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProducerState::Init => "INIT",
            ProducerState::Running => "RUNNING",
            ProducerState::Done => "DONE",
            ProducerState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Drives one producer through INIT → RUNNING → DONE/FAILED.
///
/// A failure goes to the run's error slot. `close` runs on every path and the
/// latch guard is released last, after the producer dropped its publisher.
pub fn run_producer(
    mut producer: Box<dyn DataProducer>,
    run: Arc<RunState>,
    guard: LatchGuard,
) -> ProducerState {
    let mut state = ProducerState::Init;
    debug!(producer = producer.name(), %state, "Producer starting");

    let result = match producer.init() {
        Ok(()) => {
            state = ProducerState::Running;
            debug!(producer = producer.name(), %state, "Producer reading");
            producer.read_data()
        }
        Err(e) => Err(e),
    };

    state = match result {
        Ok(rows) => {
            info!(producer = producer.name(), rows, "Producer finished");
            ProducerState::Done
        }
        Err(e) => {
            run.record_error(producer.name(), e.into());
            ProducerState::Failed
        }
    };
    debug!(producer = producer.name(), %state, "Producer closing");

    producer.close();
    drop(producer);
    drop(guard);
    state
}
