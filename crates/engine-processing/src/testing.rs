use async_trait::async_trait;
use connectors::sql::{
    connection::{ConnectionSource, DbConnection, RawRow, RowCursor},
    error::DbError,
};
use model::{metadata::field::TableFieldMetaInfo, topology::shard::ShardTarget};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Records every executed statement as `(target, sql)`. Statements containing
/// `fail_on` are rejected.
#[derive(Default)]
pub struct RecordingSource {
    pub executed: Arc<Mutex<Vec<(String, String)>>>,
    pub rows: Vec<RawRow>,
    pub fail_on: Option<String>,
}

impl RecordingSource {
    pub fn statements(&self) -> Vec<(String, String)> {
        self.executed.lock().unwrap().clone()
    }
}

struct RecordingConnection {
    target: String,
    executed: Arc<Mutex<Vec<(String, String)>>>,
    rows: Vec<RawRow>,
    fail_on: Option<String>,
}

struct VecCursor {
    rows: VecDeque<RawRow>,
    columns: usize,
}

#[async_trait]
impl RowCursor for VecCursor {
    fn column_count(&self) -> usize {
        self.columns
    }

    async fn next_row(&mut self) -> Result<Option<RawRow>, DbError> {
        Ok(self.rows.pop_front())
    }
}

#[async_trait]
impl DbConnection for RecordingConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64, DbError> {
        if let Some(marker) = &self.fail_on {
            if sql.contains(marker.as_str()) {
                return Err(DbError::Statement(format!("rejected: {marker}")));
            }
        }
        self.executed
            .lock()
            .unwrap()
            .push((self.target.clone(), sql.to_string()));
        Ok(1)
    }

    async fn query<'a>(&'a mut self, _sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, DbError> {
        let columns = self.rows.first().map(Vec::len).unwrap_or(0);
        Ok(Box::new(VecCursor {
            rows: self.rows.clone().into(),
            columns,
        }))
    }

    async fn table_exists(&mut self, _table: &str) -> Result<bool, DbError> {
        Ok(true)
    }

    async fn database_exists(&mut self, _database: &str) -> Result<bool, DbError> {
        Ok(true)
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError> {
        Ok(Vec::new())
    }

    async fn table_field_meta(&mut self, table: &str) -> Result<TableFieldMetaInfo, DbError> {
        Ok(TableFieldMetaInfo::new(table, Vec::new()))
    }
}

#[async_trait]
impl ConnectionSource for RecordingSource {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DbError> {
        Ok(self.open("default"))
    }

    async fn connect_shard(&self, shard: &ShardTarget) -> Result<Box<dyn DbConnection>, DbError> {
        Ok(self.open(&shard.shard_id))
    }
}

impl RecordingSource {
    fn open(&self, target: &str) -> Box<dyn DbConnection> {
        Box::new(RecordingConnection {
            target: target.to_string(),
            executed: self.executed.clone(),
            rows: self.rows.clone(),
            fail_on: self.fail_on.clone(),
        })
    }
}
