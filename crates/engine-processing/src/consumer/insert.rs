use crate::{
    consumer::DataConsumer,
    error::ConsumerError,
    parse::RecordParser,
    statement::InsertStatementBuilder,
};
use async_trait::async_trait;
use connectors::sql::connection::DbConnection;
use engine_core::context::consumer::ConsumerContext;
use model::records::batch::RowBatch;
use tracing::trace;

/// Writes every row of an unsharded table through one connection.
pub struct InsertConsumer {
    name: String,
    ctx: ConsumerContext,
    parser: RecordParser,
    builder: InsertStatementBuilder,
    conn: Option<Box<dyn DbConnection>>,
}

impl InsertConsumer {
    pub fn new(ctx: ConsumerContext, worker_index: usize) -> Self {
        let settings = ctx.settings();
        Self {
            name: format!("{}-insert-{}", settings.table, worker_index),
            parser: RecordParser::for_format(settings.format, &settings.separator),
            builder: InsertStatementBuilder::new(
                &settings.table,
                settings.insert_ignore,
                settings.insert_batch_rows,
                settings.max_statement_bytes,
            ),
            ctx,
            conn: None,
        }
    }

    async fn flush(&mut self) -> Result<(), ConsumerError> {
        let Some(stmt) = self.builder.take() else {
            return Ok(());
        };
        let target = self.ctx.settings().table.clone();

        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self
                .ctx
                .source()
                .connect()
                .await
                .map_err(|source| ConsumerError::Connect {
                    target: target.clone(),
                    source,
                })?,
        };
        let result = conn.execute(&stmt.sql).await;
        self.conn = Some(conn);

        result.map_err(|source| ConsumerError::Execute { target, source })?;
        trace!(consumer = %self.name, rows = stmt.rows, "Flushed INSERT");
        self.ctx.run().metrics().increment_written(stmt.rows);
        Ok(())
    }
}

#[async_trait]
impl DataConsumer for InsertConsumer {
    async fn consume(&mut self, batch: &RowBatch) -> Result<(), ConsumerError> {
        for row in batch.rows() {
            let fields = self.parser.split(row);
            if self.builder.push_row(&fields) {
                self.flush().await?;
            }
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), ConsumerError> {
        let result = self.flush().await;
        self.conn = None;
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSource;
    use engine_core::{
        context::{consumer::ConsumerSettings, run::RunState},
        metrics::Metrics,
        topology::Topology,
    };
    use model::execution::modes::RecordFormat;
    use std::sync::Arc;

    fn context(source: Arc<RecordingSource>, insert_batch_rows: usize) -> ConsumerContext {
        ConsumerContext::new(
            ConsumerSettings {
                table: "users".into(),
                format: RecordFormat::Delimited,
                separator: ",".into(),
                insert_ignore: false,
                insert_batch_rows,
                max_statement_bytes: 1 << 20,
            },
            source,
            Arc::new(Topology::default()),
            RunState::new(1, Metrics::new()),
        )
    }

    fn batch(rows: &[&str]) -> RowBatch {
        let mut batch = RowBatch::with_capacity(rows.len());
        for row in rows {
            batch.push(row.to_string());
        }
        batch.seal(0, 0);
        batch
    }

    #[tokio::test]
    async fn flushes_at_threshold_and_on_finish() {
        let source = Arc::new(RecordingSource::default());
        let ctx = context(source.clone(), 2);
        let mut consumer = InsertConsumer::new(ctx.clone(), 0);

        consumer.consume(&batch(&["1,a", "2,b", "3,c"])).await.unwrap();
        assert_eq!(source.statements().len(), 1);

        consumer.finish().await.unwrap();
        let statements = source.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1].1,
            "INSERT INTO `users` VALUES ('3','c')"
        );
        assert!(statements.iter().all(|(target, _)| target == "default"));
        assert_eq!(ctx.run().metrics().snapshot().rows_written, 3);
    }

    #[tokio::test]
    async fn failed_statement_is_reported() {
        let source = Arc::new(RecordingSource {
            fail_on: Some("'bad'".into()),
            ..Default::default()
        });
        let mut consumer = InsertConsumer::new(context(source.clone(), 1), 0);

        let err = consumer.consume(&batch(&["1,bad"])).await.unwrap_err();
        assert!(matches!(err, ConsumerError::Execute { .. }));

        consumer.consume(&batch(&["2,good"])).await.unwrap();
        assert_eq!(source.statements().len(), 1);
    }
}
