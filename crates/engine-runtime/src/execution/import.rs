use crate::{
    error::TransferError,
    execution::{
        ddl::{DdlReplicator, load_ddl_file},
        files::{files_for_table, group_files},
        workers::run_workers,
    },
};
use connectors::sql::connection::ConnectionSource;
use engine_config::{
    error::ConfigError,
    report::summary::{RunSummary, TableSummary},
    settings::JobConfig,
};
use engine_core::{
    buffer::{BatchPublisher, batch_buffer},
    context::{
        consumer::{ConsumerContext, ConsumerSettings},
        producer::{ProducerContext, ProducerSettings},
        run::RunState,
    },
    error::PipelineError,
    metrics::{FileReaderStat, Metrics},
    topology::Topology,
};
use engine_processing::{
    consumer::{DataConsumer, create_consumer},
    producer::{DataProducer, benchmark::BenchmarkProducer, file::FileReader},
};
use model::execution::modes::DdlMode;
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::{error, info, warn};

/// Drives an import job: optional DDL replication, then one batch pipeline per
/// table, one table after another.
pub struct ImportExecutor {
    config: JobConfig,
    source: Arc<dyn ConnectionSource>,
    topology: Arc<Topology>,
}

impl ImportExecutor {
    pub fn new(config: JobConfig, source: Arc<dyn ConnectionSource>) -> Result<Self, TransferError> {
        config.validate()?;
        let topology = Arc::new(Topology::new(config.topology.iter().cloned()));
        Ok(Self {
            config,
            source,
            topology,
        })
    }

    /// Runs every table and returns the run summary. A table failure does not
    /// stop later tables; the first failure is returned at the end together
    /// with the summary of everything that ran.
    pub async fn execute(&self) -> Result<RunSummary, TransferError> {
        let result = self.run().await;
        if let Err(e) = self.source.shutdown().await {
            warn!(error = %e, "Failed to shut down connection source");
        }
        result
    }

    async fn run(&self) -> Result<RunSummary, TransferError> {
        let started = Instant::now();
        let mut summary = RunSummary::new("import");
        let ddl_mode = self.config.import.ddl_mode;

        if ddl_mode != DdlMode::NoDdl {
            self.replicate_ddl().await?;
            if ddl_mode == DdlMode::DdlOnly {
                info!("DDL-only import finished");
                summary.elapsed_ms = started.elapsed().as_millis() as u64;
                return Ok(summary);
            }
        }

        let tables = self.resolve_tables().await?;
        info!(tables = tables.len(), mode = %ddl_mode, "Starting import");

        let mut first_error = None;
        for table in &tables {
            let (table_summary, result) = self.import_table(table).await;
            summary.push(table_summary);
            if let Err(e) = result {
                error!(table = %table, error = %e, "Table import failed");
                first_error.get_or_insert(e);
            }
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            tables = summary.tables.len(),
            rows = summary.total_rows_written(),
            elapsed_ms = summary.elapsed_ms,
            "Import finished"
        );

        match first_error {
            Some(source) => Err(TransferError::Failed {
                summary: Box::new(summary),
                source: Box::new(source),
            }),
            None => Ok(summary),
        }
    }

    async fn replicate_ddl(&self) -> Result<(), TransferError> {
        let path = self
            .config
            .import
            .ddl_file
            .as_deref()
            .ok_or(ConfigError::MissingField("import.ddl_file"))?;
        let statements = load_ddl_file(path)?;
        info!(path = %path.display(), statements = statements.len(), "Replicating DDL");

        DdlReplicator::new(self.source.clone(), self.config.import.drop_table_if_exists)
            .replicate(&statements)
            .await?;
        Ok(())
    }

    /// The configured tables, or every table of the target database. Each one
    /// must exist on the target (on every shard for sharded tables).
    async fn resolve_tables(&self) -> Result<Vec<String>, TransferError> {
        let mut conn = self.source.connect().await?;
        let tables = if self.config.tables.is_empty() {
            conn.list_tables().await?
        } else {
            self.config.tables.clone()
        };

        for table in &tables {
            if self.topology.is_sharded(table) {
                for shard in self.topology.shards(table).map_err(PipelineError::from)? {
                    let mut shard_conn = self.source.connect_shard(shard).await?;
                    if !shard_conn.table_exists(&shard.physical_table).await? {
                        return Err(TransferError::MissingTable(shard.to_string()));
                    }
                }
            } else if !conn.table_exists(table).await? {
                return Err(TransferError::MissingTable(table.clone()));
            }
        }
        Ok(tables)
    }

    async fn import_table(&self, table: &str) -> (TableSummary, Result<(), TransferError>) {
        let started = Instant::now();
        let metrics = Metrics::new();
        let mut readers = Vec::new();

        let result = self.run_table(table, &metrics, &mut readers).await;
        info!(
            table = %table,
            rows = metrics.snapshot().rows_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Table import finished"
        );

        let table_summary = TableSummary::new(table, &metrics.snapshot(), &readers, result.as_ref().err());
        (table_summary, result)
    }

    async fn run_table(
        &self,
        table: &str,
        metrics: &Metrics,
        readers: &mut Vec<FileReaderStat>,
    ) -> Result<(), TransferError> {
        let pipeline = &self.config.pipeline;
        let plan = self.producer_plan(table)?;
        let consumer_count = pipeline.consumers;

        let run = RunState::new(plan.len() + consumer_count, metrics.clone());
        let (publisher, claimer) = batch_buffer(pipeline.buffer_capacity);

        let consumer_ctx = ConsumerContext::new(
            self.consumer_settings(table),
            self.source.clone(),
            self.topology.clone(),
            run.clone(),
        );
        let consumers = (0..consumer_count)
            .map(|i| create_consumer(&consumer_ctx, i, self.config.import.process_only))
            .collect::<Result<Vec<Box<dyn DataConsumer>>, _>>()?;

        let producer_ctx = ProducerContext::new(self.producer_settings(table), run.clone());
        let producers = plan.build(&producer_ctx, &publisher);
        // Only the producers may keep the buffer open.
        drop(publisher);

        let outcome = run_workers(run.clone(), producers, consumers, claimer).await;
        readers.extend(run.reader_stats());
        outcome?;
        Ok(())
    }

    fn producer_plan(&self, table: &str) -> Result<ProducerPlan, TransferError> {
        let producers = self.config.pipeline.producers;
        if let Some(rows) = self.config.import.benchmark_rows {
            let count = (rows as usize).clamp(1, producers.max(1));
            let per = rows / count as u64;
            let extra = rows % count as u64;
            let mut next_id = 1u64;
            let ranges = (0..count as u64)
                .map(|i| {
                    let len = per + u64::from(i < extra);
                    let range = (next_id, len);
                    next_id += len;
                    range
                })
                .collect();
            return Ok(ProducerPlan::Benchmark(ranges));
        }

        let files = files_for_table(&self.config.import, table)?;
        info!(table = %table, files = files.len(), "Resolved source files");
        Ok(ProducerPlan::Files(group_files(&files, producers)))
    }

    fn producer_settings(&self, table: &str) -> ProducerSettings {
        let format = &self.config.format;
        let pipeline = &self.config.pipeline;
        ProducerSettings {
            table: table.to_string(),
            format: format.record_format,
            separator: format.separator.clone(),
            charset: format.charset,
            with_header: format.with_header,
            batch_size: pipeline.batch_size,
            max_multiline: pipeline.max_csv_multiline,
        }
    }

    fn consumer_settings(&self, table: &str) -> ConsumerSettings {
        let format = &self.config.format;
        let pipeline = &self.config.pipeline;
        ConsumerSettings {
            table: table.to_string(),
            format: format.record_format,
            separator: format.separator.clone(),
            insert_ignore: self.config.import.insert_ignore,
            insert_batch_rows: pipeline.insert_batch_rows,
            max_statement_bytes: pipeline.max_statement_bytes,
        }
    }
}

/// What the producers of one table read.
enum ProducerPlan {
    /// One group of `(source index, path)` per file reader.
    Files(Vec<Vec<(usize, PathBuf)>>),
    /// `(first id, rows)` per benchmark producer.
    Benchmark(Vec<(u64, u64)>),
}

impl ProducerPlan {
    fn len(&self) -> usize {
        match self {
            ProducerPlan::Files(groups) => groups.len(),
            ProducerPlan::Benchmark(ranges) => ranges.len(),
        }
    }

    fn build(self, ctx: &ProducerContext, publisher: &BatchPublisher) -> Vec<Box<dyn DataProducer>> {
        match self {
            ProducerPlan::Files(groups) => groups
                .into_iter()
                .enumerate()
                .map(|(i, files)| {
                    Box::new(FileReader::new(i, ctx.clone(), files, publisher.clone()))
                        as Box<dyn DataProducer>
                })
                .collect(),
            ProducerPlan::Benchmark(ranges) => ranges
                .into_iter()
                .enumerate()
                .map(|(i, (first_id, rows))| {
                    Box::new(BenchmarkProducer::new(i, ctx.clone(), first_id, rows, publisher.clone()))
                        as Box<dyn DataProducer>
                })
                .collect(),
        }
    }
}
