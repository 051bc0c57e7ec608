use engine_core::{buffer::BatchClaimer, context::run::RunState, error::PipelineError};
use engine_processing::{
    consumer::{DataConsumer, run_consumer},
    producer::{DataProducer, run_producer},
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs one table's workers to completion and returns the first recorded error.
///
/// Producers run on blocking threads, consumers as async tasks. Every worker
/// holds one latch slot; the latch reaching zero means every producer dropped
/// its publisher and every consumer saw end-of-stream.
pub async fn run_workers(
    run: Arc<RunState>,
    producers: Vec<Box<dyn DataProducer>>,
    consumers: Vec<Box<dyn DataConsumer>>,
    claimer: BatchClaimer,
) -> Result<(), PipelineError> {
    let expected = producers.len() + consumers.len();
    if run.pending_workers() != expected {
        return Err(PipelineError::Configuration(format!(
            "run expects {} workers but {} were created",
            run.pending_workers(),
            expected
        )));
    }

    let mut producer_handles = Vec::with_capacity(producers.len());
    for producer in producers {
        let name = producer.name().to_string();
        let run = run.clone();
        let guard = run.checkout();
        let handle = tokio::task::spawn_blocking(move || run_producer(producer, run, guard));
        producer_handles.push((name, handle));
    }

    let mut consumer_handles = Vec::with_capacity(consumers.len());
    for consumer in consumers {
        let name = consumer.name().to_string();
        let guard = run.checkout();
        let handle = tokio::spawn(run_consumer(consumer, claimer.clone(), run.clone(), guard));
        consumer_handles.push((name, handle));
    }
    // End-of-stream needs every receiver handle outside the consumers gone too.
    drop(claimer);

    run.wait().await;
    debug!("All workers released the run latch");

    let (names, handles): (Vec<_>, Vec<_>) = producer_handles.into_iter().unzip();
    for (name, joined) in names.into_iter().zip(join_all(handles).await) {
        if let Err(e) = joined {
            error!(worker = %name, error = %e, "Producer task aborted");
            run.record_error(&name, PipelineError::Worker { worker: name.clone(), message: e.to_string() });
        }
    }

    let (names, handles): (Vec<_>, Vec<_>) = consumer_handles.into_iter().unzip();
    for (name, joined) in names.into_iter().zip(join_all(handles).await) {
        if let Err(e) = joined {
            error!(worker = %name, error = %e, "Consumer task aborted");
            run.record_error(&name, PipelineError::Worker { worker: name.clone(), message: e.to_string() });
        }
    }

    match run.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
