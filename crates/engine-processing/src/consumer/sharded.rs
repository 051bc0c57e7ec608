use crate::{
    consumer::DataConsumer,
    error::ConsumerError,
    parse::RecordParser,
    statement::InsertStatementBuilder,
};
use async_trait::async_trait;
use connectors::sql::connection::DbConnection;
use engine_core::{context::consumer::ConsumerContext, error::ResolutionError};
use model::{records::batch::RowBatch, topology::shard::ShardTarget};
use tracing::{trace, warn};

struct ShardWriter {
    target: ShardTarget,
    builder: InsertStatementBuilder,
    conn: Option<Box<dyn DbConnection>>,
}

/// Routes each row to its owning shard. Every shard has its own statement
/// and its own lazily opened connection; shards are never mixed in one INSERT.
pub struct ShardedInsertConsumer {
    name: String,
    ctx: ConsumerContext,
    parser: RecordParser,
    partition_column: usize,
    shards: Vec<ShardWriter>,
}

impl ShardedInsertConsumer {
    pub fn new(ctx: ConsumerContext, worker_index: usize) -> Result<Self, ConsumerError> {
        let settings = ctx.settings();
        let topology = ctx.topology();
        let partition_column = topology.partition_column(&settings.table)?;
        let shards = topology
            .shards(&settings.table)?
            .iter()
            .map(|target| ShardWriter {
                builder: InsertStatementBuilder::new(
                    &target.physical_table,
                    settings.insert_ignore,
                    settings.insert_batch_rows,
                    settings.max_statement_bytes,
                ),
                target: target.clone(),
                conn: None,
            })
            .collect();

        Ok(Self {
            name: format!("{}-sharded-{}", settings.table, worker_index),
            parser: RecordParser::for_format(settings.format, &settings.separator),
            partition_column,
            shards,
            ctx,
        })
    }

    async fn flush_shard(&mut self, index: usize) -> Result<(), ConsumerError> {
        let Some(shard) = self.shards.get_mut(index) else {
            return Ok(());
        };
        let Some(stmt) = shard.builder.take() else {
            return Ok(());
        };
        let target = shard.target.to_string();

        let mut conn = match shard.conn.take() {
            Some(conn) => conn,
            None => self
                .ctx
                .source()
                .connect_shard(&shard.target)
                .await
                .map_err(|source| ConsumerError::Connect {
                    target: target.clone(),
                    source,
                })?,
        };
        let result = conn.execute(&stmt.sql).await;
        shard.conn = Some(conn);

        result.map_err(|source| ConsumerError::Execute {
            target: target.clone(),
            source,
        })?;
        trace!(consumer = %self.name, shard = %target, rows = stmt.rows, "Flushed INSERT");
        self.ctx.run().metrics().increment_written(stmt.rows);
        Ok(())
    }
}

#[async_trait]
impl DataConsumer for ShardedInsertConsumer {
    async fn consume(&mut self, batch: &RowBatch) -> Result<(), ConsumerError> {
        let table = &self.ctx.settings().table;

        // resolve the whole batch before buffering any of it
        let mut routed = Vec::with_capacity(batch.len());
        for row in batch.rows() {
            let fields = self.parser.split(row);
            let key = fields
                .get(self.partition_column)
                .ok_or_else(|| ResolutionError::MissingKey {
                    table: table.clone(),
                    column: self.partition_column,
                })?;
            let (index, _) = self.ctx.topology().resolve_shard(table, key.as_bytes())?;
            routed.push((index, fields));
        }

        for (index, fields) in routed {
            if self.shards[index].builder.push_row(&fields) {
                self.flush_shard(index).await?;
            }
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), ConsumerError> {
        let mut first_error = None;
        for index in 0..self.shards.len() {
            if let Err(e) = self.flush_shard(index).await {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    warn!(consumer = %self.name, error = %e, "Residual flush failed");
                }
            }
        }
        for shard in &mut self.shards {
            shard.conn = None;
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
