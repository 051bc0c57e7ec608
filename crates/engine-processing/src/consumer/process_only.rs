use crate::{consumer::DataConsumer, error::ConsumerError, parse::RecordParser};
use async_trait::async_trait;
use engine_core::context::consumer::ConsumerContext;
use model::records::batch::RowBatch;
use tracing::info;

/// Parses rows and discards them. Measures read throughput.
pub struct ProcessOnlyConsumer {
    name: String,
    parser: RecordParser,
    rows: u64,
    fields: u64,
}

impl ProcessOnlyConsumer {
    pub fn new(ctx: ConsumerContext, worker_index: usize) -> Self {
        let settings = ctx.settings();
        Self {
            name: format!("{}-process-{}", settings.table, worker_index),
            parser: RecordParser::for_format(settings.format, &settings.separator),
            rows: 0,
            fields: 0,
        }
    }
}

#[async_trait]
impl DataConsumer for ProcessOnlyConsumer {
    async fn consume(&mut self, batch: &RowBatch) -> Result<(), ConsumerError> {
        for row in batch.rows() {
            self.fields += self.parser.split(row).len() as u64;
            self.rows += 1;
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), ConsumerError> {
        info!(consumer = %self.name, rows = self.rows, fields = self.fields, "Processed without writing");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
