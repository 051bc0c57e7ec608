use crate::utils::parse_insert;
use async_trait::async_trait;
use connectors::sql::{
    connection::{ConnectionSource, DbConnection, RawRow, RowCursor},
    error::DbError,
};
use engine_runtime::execution::ddl::{DdlObject, DdlStatement};
use model::{
    core::data_type::DataType,
    metadata::field::{FieldMetaInfo, TableFieldMetaInfo},
    topology::shard::ShardTarget,
};
use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::{Arc, Mutex},
};

/// Target name of connections opened with [`ConnectionSource::connect`].
pub const DEFAULT_TARGET: &str = "default";

pub type MemoryRow = Vec<Option<String>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<FieldMetaInfo>,
    pub rows: Vec<MemoryRow>,
}

#[derive(Default)]
struct MemoryState {
    /// `(target, table)` → table. Shards are targets named by their shard id.
    tables: BTreeMap<(String, String), MemoryTable>,
    databases: BTreeSet<(String, String)>,
    executed: Vec<(String, String)>,
    fail_on: Option<String>,
    shutdowns: usize,
}

/// In-process stand-in for a MySQL server and its shards.
///
/// Understands the statements the engine emits: multi-row `INSERT`, `CREATE
/// TABLE`/`CREATE DATABASE`, `DROP TABLE` and the export `SELECT`. `WHERE`
/// filters are accepted but not evaluated.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Arc<dyn ConnectionSource> {
        Arc::new(self.clone())
    }

    pub fn with_table(self, target: &str, table: &str, columns: &[(&str, DataType)]) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, (name, data_type))| FieldMetaInfo::new(*name, i, data_type.clone()))
            .collect();
        self.state.lock().unwrap().tables.insert(
            (target.to_string(), table.to_string()),
            MemoryTable {
                columns,
                rows: Vec::new(),
            },
        );
        self
    }

    pub fn with_database(self, target: &str, database: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .databases
            .insert((target.to_string(), database.to_string()));
        self
    }

    /// Every executed statement containing `marker` fails.
    pub fn fail_statements_containing(self, marker: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(marker.to_string());
        self
    }

    pub fn insert_rows(&self, target: &str, table: &str, rows: Vec<MemoryRow>) {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .tables
            .get_mut(&(target.to_string(), table.to_string()))
            .expect("table registered");
        entry.rows.extend(rows);
    }

    pub fn rows(&self, target: &str, table: &str) -> Vec<MemoryRow> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(&(target.to_string(), table.to_string()))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn has_table(&self, target: &str, table: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .tables
            .contains_key(&(target.to_string(), table.to_string()))
    }

    /// Number of times the engine shut the source down.
    pub fn shutdowns(&self) -> usize {
        self.state.lock().unwrap().shutdowns
    }

    /// `(target, sql)` of every statement executed so far, queries included.
    pub fn executed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn inserts(&self) -> Vec<(String, String)> {
        self.executed()
            .into_iter()
            .filter(|(_, sql)| sql.starts_with("INSERT"))
            .collect()
    }

    fn open(&self, target: &str) -> Box<dyn DbConnection> {
        Box::new(MemoryConnection {
            target: target.to_string(),
            state: self.state.clone(),
        })
    }
}

#[async_trait]
impl ConnectionSource for MemoryDatabase {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DbError> {
        Ok(self.open(DEFAULT_TARGET))
    }

    async fn connect_shard(&self, shard: &ShardTarget) -> Result<Box<dyn DbConnection>, DbError> {
        Ok(self.open(&shard.shard_id))
    }

    async fn shutdown(&self) -> Result<(), DbError> {
        self.state.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}

struct MemoryConnection {
    target: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    fn key(&self, table: &str) -> (String, String) {
        (self.target.clone(), table.to_string())
    }

    fn apply(&self, state: &mut MemoryState, sql: &str) -> Result<u64, DbError> {
        if sql.starts_with("INSERT") {
            let (table, rows) = parse_insert(sql)
                .ok_or_else(|| DbError::Statement(format!("unparsable insert: {sql}")))?;
            let entry = state
                .tables
                .get_mut(&self.key(&table))
                .ok_or_else(|| DbError::Statement(format!("Table '{table}' doesn't exist")))?;
            let count = rows.len() as u64;
            entry.rows.extend(rows);
            return Ok(count);
        }

        if let Some(table) = sql.strip_prefix("DROP TABLE ") {
            let table = table.trim().trim_matches('`');
            state.tables.remove(&self.key(table));
            return Ok(0);
        }

        let statement = DdlStatement::parse(sql);
        match statement.object {
            DdlObject::Table(name) => {
                let key = self.key(&name);
                if state.tables.contains_key(&key) {
                    if statement.if_not_exists {
                        return Ok(0);
                    }
                    return Err(DbError::Statement(format!("Table '{name}' already exists")));
                }
                state.tables.insert(key, MemoryTable::default());
            }
            DdlObject::Database(name) => {
                state.databases.insert(self.key(&name));
            }
            DdlObject::Other => {}
        }
        Ok(0)
    }
}

#[async_trait]
impl DbConnection for MemoryConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64, DbError> {
        let mut state = self.state.lock().unwrap();
        if let Some(marker) = &state.fail_on {
            if sql.contains(marker.as_str()) {
                return Err(DbError::Statement(format!("rejected statement containing '{marker}'")));
            }
        }
        state.executed.push((self.target.clone(), sql.to_string()));
        self.apply(&mut state, sql)
    }

    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, DbError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push((self.target.clone(), sql.to_string()));

        let (projection, table) =
            parse_select(sql).ok_or_else(|| DbError::Statement(format!("unparsable query: {sql}")))?;
        let entry = state
            .tables
            .get(&self.key(&table))
            .ok_or_else(|| DbError::Statement(format!("Table '{table}' doesn't exist")))?;

        let positions: Vec<usize> = match projection {
            None => (0..entry.columns.len()).collect(),
            Some(columns) => columns
                .iter()
                .map(|c| {
                    entry
                        .columns
                        .iter()
                        .position(|f| &f.name == c)
                        .ok_or_else(|| DbError::Statement(format!("Unknown column '{c}'")))
                })
                .collect::<Result<_, _>>()?,
        };

        let rows = entry
            .rows
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|&p| row.get(p).cloned().flatten().map(String::into_bytes))
                    .collect::<RawRow>()
            })
            .collect();

        Ok(Box::new(MemoryCursor {
            rows,
            columns: positions.len(),
        }))
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, DbError> {
        Ok(self.state.lock().unwrap().tables.contains_key(&self.key(table)))
    }

    async fn database_exists(&mut self, database: &str) -> Result<bool, DbError> {
        Ok(self.state.lock().unwrap().databases.contains(&self.key(database)))
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tables
            .keys()
            .filter(|(target, _)| *target == self.target)
            .map(|(_, table)| table.clone())
            .collect())
    }

    async fn table_field_meta(&mut self, table: &str) -> Result<TableFieldMetaInfo, DbError> {
        let state = self.state.lock().unwrap();
        let entry = state
            .tables
            .get(&self.key(table))
            .ok_or_else(|| DbError::Statement(format!("Table '{table}' doesn't exist")))?;
        Ok(TableFieldMetaInfo::new(table, entry.columns.clone()))
    }
}

struct MemoryCursor {
    rows: VecDeque<RawRow>,
    columns: usize,
}

#[async_trait]
impl RowCursor for MemoryCursor {
    fn column_count(&self) -> usize {
        self.columns
    }

    async fn next_row(&mut self) -> Result<Option<RawRow>, DbError> {
        Ok(self.rows.pop_front())
    }
}

/// `SELECT <cols> FROM `t` [WHERE ...]` → (columns, table). `*` yields `None`.
fn parse_select(sql: &str) -> Option<(Option<Vec<String>>, String)> {
    let rest = sql.strip_prefix("SELECT ")?;
    let (projection, rest) = rest.split_once(" FROM ")?;
    let table = rest.split(" WHERE ").next()?.trim().trim_matches('`').to_string();
    let columns = match projection.trim() {
        "*" => None,
        list => Some(
            list.split(',')
                .map(|c| c.trim().trim_matches('`').to_string())
                .collect(),
        ),
    };
    Some((columns, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inserts_and_selects_round_trip() {
        let db = MemoryDatabase::new().with_table(
            DEFAULT_TARGET,
            "t",
            &[("id", DataType::Int), ("name", DataType::VarChar)],
        );
        let mut conn = db.source().connect().await.unwrap();
        let inserted = conn
            .execute("INSERT INTO `t` VALUES ('1','a'),('2',NULL)")
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let mut cursor = conn.query("SELECT `name`,`id` FROM `t`").await.unwrap();
        assert_eq!(cursor.column_count(), 2);
        assert_eq!(
            cursor.next_row().await.unwrap(),
            Some(vec![Some(b"a".to_vec()), Some(b"1".to_vec())])
        );
        assert_eq!(cursor.next_row().await.unwrap(), Some(vec![None, Some(b"2".to_vec())]));
        assert_eq!(cursor.next_row().await.unwrap(), None);
    }
}
