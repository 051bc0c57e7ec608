use crate::sql::error::DbError;
use async_trait::async_trait;
use model::{metadata::field::TableFieldMetaInfo, topology::shard::ShardTarget};

/// One result row in text protocol form. `None` is SQL NULL.
pub type RawRow = Vec<Option<Vec<u8>>>;

/// Incremental reader over a streaming result set.
///
/// Rows are pulled one at a time so exports never hold a whole table in
/// memory. Dropping the cursor releases the result set.
#[async_trait]
pub trait RowCursor: Send {
    fn column_count(&self) -> usize;

    async fn next_row(&mut self) -> Result<Option<RawRow>, DbError>;
}

/// A single database session owned by exactly one worker.
///
/// The connection goes back to its pool when dropped.
#[async_trait]
pub trait DbConnection: Send {
    /// Executes a statement and returns the affected row count.
    async fn execute(&mut self, sql: &str) -> Result<u64, DbError>;

    /// Opens a streaming query.
    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, DbError>;

    async fn table_exists(&mut self, table: &str) -> Result<bool, DbError>;

    async fn database_exists(&mut self, database: &str) -> Result<bool, DbError>;

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError>;

    /// Column metadata in ordinal order.
    async fn table_field_meta(&mut self, table: &str) -> Result<TableFieldMetaInfo, DbError>;
}

/// Hands out connections to the default target or to a physical shard.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DbError>;

    async fn connect_shard(&self, shard: &ShardTarget) -> Result<Box<dyn DbConnection>, DbError>;

    /// Closes pooled resources. Safe to call more than once.
    async fn shutdown(&self) -> Result<(), DbError> {
        Ok(())
    }
}
