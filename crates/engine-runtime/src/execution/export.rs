use crate::error::TransferError;
use connectors::{
    sink::{LocalSinkFactory, SinkFactory},
    sql::connection::ConnectionSource,
};
use engine_config::{
    report::summary::{RunSummary, TableSummary},
    settings::JobConfig,
};
use engine_core::{
    error::PipelineError,
    metrics::{FileReaderStat, TableMetrics},
    topology::Topology,
};
use engine_processing::{
    error::ExportError,
    export::{
        masker::{ColumnMaskers, DataMasker, RedactMasker},
        query::build_export_sql,
        worker::{ExportTask, ExportWorker},
        writer::FieldWriter,
    },
};
use futures::future::join_all;
use model::{metadata::field::TableFieldMetaInfo, topology::shard::ShardTarget};
use std::{collections::BTreeMap, sync::Arc, time::Instant};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Drives an export job. Every table is planned first, so configuration
/// problems such as unknown columns surface before any file is written. The
/// export workers of all tables then run concurrently, at most
/// `pipeline.consumers` at a time.
pub struct ExportExecutor {
    config: JobConfig,
    source: Arc<dyn ConnectionSource>,
    sinks: Arc<dyn SinkFactory>,
    topology: Arc<Topology>,
    maskers: BTreeMap<String, Vec<(String, Arc<dyn DataMasker>)>>,
}

impl ExportExecutor {
    pub fn new(
        config: JobConfig,
        source: Arc<dyn ConnectionSource>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Result<Self, TransferError> {
        config.validate()?;
        let topology = Arc::new(Topology::new(config.topology.iter().cloned()));
        Ok(Self {
            config,
            source,
            sinks,
            topology,
            maskers: BTreeMap::new(),
        })
    }

    /// Writes into local files under `export.output_dir`.
    pub fn from_config(config: JobConfig, source: Arc<dyn ConnectionSource>) -> Result<Self, TransferError> {
        let export = &config.export;
        let sinks = LocalSinkFactory::new(export.output_dir.clone(), export.prefix.clone())
            .with_compression(export.compress)
            .with_encryption(export.encryption)
            .with_file_format(export.file_format);
        Self::new(config, source, Arc::new(sinks))
    }

    /// Registers a custom masker for `table.column`, in addition to the
    /// redacting maskers of `export.mask_columns`.
    pub fn with_masker(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        masker: Arc<dyn DataMasker>,
    ) -> Self {
        self.maskers
            .entry(table.into())
            .or_default()
            .push((column.into(), masker));
        self
    }

    pub async fn execute(&self) -> Result<RunSummary, TransferError> {
        let result = self.run().await;
        if let Err(e) = self.source.shutdown().await {
            warn!(error = %e, "Failed to shut down connection source");
        }
        result
    }

    async fn run(&self) -> Result<RunSummary, TransferError> {
        let started = Instant::now();
        let tables = self.resolve_tables().await?;

        let metrics = TableMetrics::new();
        let mut workers = Vec::new();
        for table in &tables {
            workers.extend(self.plan_table(table, &metrics).await?);
        }
        info!(tables = tables.len(), workers = workers.len(), "Starting export");

        let permits = Arc::new(Semaphore::new(self.config.pipeline.consumers.max(1)));
        let handles = workers.into_iter().map(|worker| {
            let table_metrics = metrics.for_table(&worker.task().table);
            let permits = permits.clone();
            let table = worker.task().table.clone();
            let target = worker.task().target();
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result = worker.run().await;
                if result.is_err() {
                    table_metrics.increment_failures(1);
                }
                result
            });
            (table, target, handle)
        });

        let (keys, handles): (Vec<_>, Vec<_>) = handles
            .map(|(table, target, handle)| ((table, target), handle))
            .unzip();
        let mut failures: BTreeMap<String, TransferError> = BTreeMap::new();
        for ((table, target), joined) in keys.into_iter().zip(join_all(handles).await) {
            let err: TransferError = match joined {
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => PipelineError::from(e).into(),
                Err(e) => PipelineError::Worker {
                    worker: target.clone(),
                    message: e.to_string(),
                }
                .into(),
            };
            error!(table = %table, target = %target, error = %err, "Export worker failed");
            failures.entry(table).or_insert(err);
        }

        let mut summary = RunSummary::new("export");
        let snapshots = metrics.snapshot();
        for table in &tables {
            let snapshot = snapshots.get(table).copied().unwrap_or_default();
            summary.push(TableSummary::new(
                table,
                &snapshot,
                &[] as &[FileReaderStat],
                failures.get(table),
            ));
        }
        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            tables = summary.tables.len(),
            rows = summary.total_rows_written(),
            elapsed_ms = summary.elapsed_ms,
            "Export finished"
        );

        let first = tables.iter().find_map(|t| failures.remove(t));
        match first {
            Some(source) => Err(TransferError::Failed {
                summary: Box::new(summary),
                source: Box::new(source),
            }),
            None => Ok(summary),
        }
    }

    async fn resolve_tables(&self) -> Result<Vec<String>, TransferError> {
        if !self.config.tables.is_empty() {
            return Ok(self.config.tables.clone());
        }
        let mut conn = self.source.connect().await?;
        Ok(conn.list_tables().await?)
    }

    /// Column metadata, maskers and one task per physical shard (or one for
    /// the whole table).
    async fn plan_table(
        &self,
        table: &str,
        metrics: &TableMetrics,
    ) -> Result<Vec<ExportWorker>, TransferError> {
        let export = &self.config.export;
        let sharded = self.topology.is_sharded(table);
        let shards: &[ShardTarget] = if sharded {
            self.topology.shards(table).map_err(PipelineError::from)?
        } else {
            &[]
        };

        let meta = match shards.first() {
            Some(shard) => {
                let mut conn = self.source.connect_shard(shard).await?;
                conn.table_field_meta(&shard.physical_table).await?
            }
            None => {
                let mut conn = self.source.connect().await?;
                conn.table_field_meta(table).await?
            }
        };
        let meta = match export.columns.get(table) {
            Some(columns) if !columns.is_empty() => meta.project(columns).map_err(|column| {
                ExportError::UnknownColumn {
                    table: table.to_string(),
                    column,
                }
            })?,
            _ => meta,
        };

        let writer = FieldWriter::new(self.config.format.quote, &self.config.format.separator, meta.string_flags())
            .with_maskers(self.column_maskers(table, &meta)?)
            .with_last_sep(self.config.format.with_last_sep);

        let columns: Vec<String> = meta.column_names().into_iter().map(str::to_string).collect();
        let filter = export.where_clause.as_deref();
        let tasks: Vec<ExportTask> = if sharded && export.per_shard {
            shards
                .iter()
                .enumerate()
                .map(|(part, shard)| ExportTask {
                    table: table.to_string(),
                    part,
                    shard: Some(shard.clone()),
                    sql: build_export_sql(&shard.physical_table, &columns, filter),
                })
                .collect()
        } else {
            vec![ExportTask {
                table: table.to_string(),
                part: 0,
                shard: None,
                sql: build_export_sql(table, &columns, filter),
            }]
        };
        info!(table = %table, columns = columns.len(), tasks = tasks.len(), "Planned table export");

        Ok(tasks
            .into_iter()
            .map(|task| {
                ExportWorker::new(
                    task,
                    writer.clone(),
                    self.config.pipeline.export_flush_rows,
                    self.source.clone(),
                    self.sinks.clone(),
                    metrics.for_table(table),
                )
            })
            .collect())
    }

    fn column_maskers(&self, table: &str, meta: &TableFieldMetaInfo) -> Result<ColumnMaskers, ExportError> {
        let mut maskers = ColumnMaskers::new(meta.len());
        if let Some(columns) = self.config.export.mask_columns.get(table) {
            for column in columns {
                maskers.register(meta, column, Arc::new(RedactMasker::default()))?;
            }
        }
        if let Some(custom) = self.maskers.get(table) {
            for (column, masker) in custom {
                maskers.register(meta, column, masker.clone())?;
            }
        }
        Ok(maskers)
    }
}
