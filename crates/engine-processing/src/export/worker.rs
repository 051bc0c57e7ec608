use crate::{error::ExportError, export::writer::FieldWriter};
use connectors::{
    sink::{ExportSink, SinkFactory},
    sql::connection::{ConnectionSource, DbConnection},
};
use engine_core::metrics::Metrics;
use model::topology::shard::ShardTarget;
use std::sync::Arc;
use tracing::{info, warn};

/// One unit of export work: a whole table, or one physical shard of it.
#[derive(Debug, Clone)]
pub struct ExportTask {
    pub table: String,
    /// Position used in the output file name.
    pub part: usize,
    /// `None` reads through the default connection.
    pub shard: Option<ShardTarget>,
    pub sql: String,
}

impl ExportTask {
    pub fn target(&self) -> String {
        match &self.shard {
            Some(shard) => shard.to_string(),
            None => self.table.clone(),
        }
    }
}

/// Streams one result set into one sink.
pub struct ExportWorker {
    task: ExportTask,
    writer: FieldWriter,
    flush_rows: usize,
    source: Arc<dyn ConnectionSource>,
    sinks: Arc<dyn SinkFactory>,
    metrics: Metrics,
}

impl ExportWorker {
    pub fn new(
        task: ExportTask,
        writer: FieldWriter,
        flush_rows: usize,
        source: Arc<dyn ConnectionSource>,
        sinks: Arc<dyn SinkFactory>,
        metrics: Metrics,
    ) -> Self {
        Self {
            task,
            writer,
            flush_rows: flush_rows.max(1),
            source,
            sinks,
            metrics,
        }
    }

    pub fn task(&self) -> &ExportTask {
        &self.task
    }

    /// Runs the export and returns the number of rows written. The connection,
    /// the result stream and the sink are released on every path.
    pub async fn run(&self) -> Result<u64, ExportError> {
        let target = self.task.target();
        let connected = match &self.task.shard {
            Some(shard) => self.source.connect_shard(shard).await,
            None => self.source.connect().await,
        };
        let mut conn = connected.map_err(|source| ExportError::Connect {
            target: target.clone(),
            source,
        })?;

        let mut sink = self.sinks.open(&self.task.table, self.task.part).await?;
        let streamed = self.stream(conn.as_mut(), sink.as_mut()).await;
        let closed = sink.close().await;
        drop(conn);

        let rows = match (streamed, closed) {
            (Ok(rows), Ok(())) => rows,
            (Ok(_), Err(e)) => return Err(e.into()),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(close_err)) => {
                warn!(target = %target, error = %close_err, "Failed to close sink after error");
                return Err(e);
            }
        };

        info!(target = %target, sink = %sink.describe(), rows, "Export finished");
        Ok(rows)
    }

    async fn stream(
        &self,
        conn: &mut dyn DbConnection,
        sink: &mut dyn ExportSink,
    ) -> Result<u64, ExportError> {
        let query_error = |source| ExportError::Query {
            target: self.task.target(),
            source,
        };

        let mut cursor = conn.query(&self.task.sql).await.map_err(query_error)?;
        let mut buf = Vec::with_capacity(cursor.column_count().max(1) * 16 * self.flush_rows);
        let mut buffered = 0usize;
        let mut total = 0u64;

        while let Some(row) = cursor.next_row().await.map_err(query_error)? {
            self.writer.write_row(&mut buf, &row);
            buffered += 1;
            if buffered == self.flush_rows {
                total += self.flush(sink, &mut buf, &mut buffered).await?;
            }
        }
        if buffered > 0 {
            total += self.flush(sink, &mut buf, &mut buffered).await?;
        }
        Ok(total)
    }

    async fn flush(
        &self,
        sink: &mut dyn ExportSink,
        buf: &mut Vec<u8>,
        buffered: &mut usize,
    ) -> Result<u64, ExportError> {
        sink.write(buf.as_slice()).await?;
        let rows = std::mem::take(buffered) as u64;
        self.metrics.increment_written(rows);
        self.metrics.increment_bytes(buf.len() as u64);
        buf.clear();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSource;
    use async_trait::async_trait;
    use connectors::sink::error::SinkError;
    use model::execution::modes::QuoteMode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySinks {
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: Arc<Mutex<u32>>,
    }

    struct MemorySink {
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl ExportSink for MemorySink {
        async fn write(&mut self, buf: &[u8]) -> Result<(), SinkError> {
            self.writes.lock().unwrap().push(buf.to_vec());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), SinkError> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".into()
        }
    }

    #[async_trait]
    impl SinkFactory for MemorySinks {
        async fn open(&self, _table: &str, _part: usize) -> Result<Box<dyn ExportSink>, SinkError> {
            Ok(Box::new(MemorySink {
                writes: self.writes.clone(),
                closed: self.closed.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn flushes_every_n_rows_and_the_tail() {
        let rows = (0..5)
            .map(|i| vec![Some(i.to_string().into_bytes()), Some(b"v".to_vec())])
            .collect();
        let source = Arc::new(RecordingSource {
            rows,
            ..Default::default()
        });
        let sinks = Arc::new(MemorySinks::default());
        let metrics = Metrics::new();

        let worker = ExportWorker::new(
            ExportTask {
                table: "t".into(),
                part: 0,
                shard: None,
                sql: "SELECT * FROM `t`".into(),
            },
            FieldWriter::new(QuoteMode::Auto, ",", vec![false, true]),
            2,
            source,
            sinks.clone(),
            metrics.clone(),
        );

        assert_eq!(worker.run().await.unwrap(), 5);

        let writes = sinks.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], b"0,v\n1,v\n");
        assert_eq!(writes[2], b"4,v\n");
        assert_eq!(*sinks.closed.lock().unwrap(), 1);
        assert_eq!(metrics.snapshot().rows_written, 5);
        assert_eq!(metrics.snapshot().bytes_written, 20);
    }
}
