use crate::{
    error::ProducerError,
    parse::RecordParser,
    producer::{DataProducer, emitter::BatchEmitter},
};
use engine_core::{buffer::BatchPublisher, context::producer::ProducerContext};

/// Synthetic `id | name | amount` rows, for measuring the insert path without
/// file I/O.
pub struct BenchmarkProducer {
    name: String,
    ctx: ProducerContext,
    source_index: usize,
    first_id: u64,
    rows: u64,
    parser: RecordParser,
    publisher: Option<BatchPublisher>,
}

impl BenchmarkProducer {
    /// Generates ids `first_id..first_id + rows`.
    pub fn new(
        source_index: usize,
        ctx: ProducerContext,
        first_id: u64,
        rows: u64,
        publisher: BatchPublisher,
    ) -> Self {
        let settings = ctx.settings();
        let parser = RecordParser::for_format(settings.format, &settings.separator);
        Self {
            name: format!("{}-bench-{}", settings.table, source_index),
            ctx,
            source_index,
            first_id,
            rows,
            parser,
            publisher: Some(publisher),
        }
    }

    fn record(&self, id: u64) -> String {
        let id_text = id.to_string();
        let name = format!("name-{id}");
        let amount = format!("{}.{:02}", id % 10_000, id % 100);
        self.parser.join(&[&id_text, &name, &amount])
    }
}

impl DataProducer for BenchmarkProducer {
    fn init(&mut self) -> Result<(), ProducerError> {
        Ok(())
    }

    fn read_data(&mut self) -> Result<u64, ProducerError> {
        let publisher = self
            .publisher
            .clone()
            .ok_or(ProducerError::ShutdownSignal)?;
        let mut emitter = BatchEmitter::new(
            publisher,
            self.ctx.run().metrics().clone(),
            self.source_index,
            self.ctx.settings().batch_size,
        );

        for id in self.first_id..self.first_id + self.rows {
            emitter.append(self.record(id))?;
        }
        emitter.finish()?;
        Ok(self.rows)
    }

    fn close(&mut self) {
        self.publisher = None;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::{ProducerState, run_producer};
    use engine_core::{
        buffer::batch_buffer,
        context::{producer::ProducerSettings, run::RunState},
        metrics::Metrics,
    };
    use model::execution::modes::{Charset, RecordFormat};

    #[tokio::test]
    async fn generates_the_requested_id_range() {
        let run = RunState::new(1, Metrics::new());
        let ctx = ProducerContext::new(
            ProducerSettings {
                table: "bench".into(),
                format: RecordFormat::Delimited,
                separator: "|".into(),
                charset: Charset::Utf8,
                with_header: false,
                batch_size: 4,
                max_multiline: 1,
            },
            run.clone(),
        );
        let (publisher, claimer) = batch_buffer(4);
        let producer = BenchmarkProducer::new(0, ctx, 10, 6, publisher);

        let guard = run.checkout();
        let state = {
            let run = run.clone();
            tokio::task::spawn_blocking(move || run_producer(Box::new(producer), run, guard))
                .await
                .unwrap()
        };
        assert_eq!(state, ProducerState::Done);

        let mut rows = Vec::new();
        while let Some(batch) = claimer.claim().await {
            rows.extend(batch.rows().map(str::to_string));
        }
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], "10|name-10|10.10");
        assert_eq!(rows[5], "15|name-15|15.15");
    }
}
