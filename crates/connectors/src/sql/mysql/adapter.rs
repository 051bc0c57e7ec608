use crate::sql::{
    connection::{DbConnection, RowCursor},
    error::DbError,
    mysql::cursor::MySqlRowCursor,
};
use async_trait::async_trait;
use model::{
    core::data_type::DataType,
    metadata::field::{FieldMetaInfo, TableFieldMetaInfo},
};
use mysql_async::{Conn, prelude::Queryable};
use tracing::{debug, trace};

const QUERY_TABLE_EXISTS_SQL: &str = include_str!("sql/table_exists.sql");
const QUERY_DATABASE_EXISTS_SQL: &str = include_str!("sql/database_exists.sql");
const QUERY_TABLE_COLUMNS_SQL: &str = include_str!("sql/table_columns.sql");

/// One pooled MySQL session.
pub struct MySqlAdapter {
    conn: Conn,
}

impl MySqlAdapter {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DbConnection for MySqlAdapter {
    async fn execute(&mut self, sql: &str) -> Result<u64, DbError> {
        trace!(bytes = sql.len(), "Executing statement");
        self.conn.query_drop(sql).await?;
        Ok(self.conn.affected_rows())
    }

    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, DbError> {
        debug!("Streaming query: {}", sql);
        let result = self.conn.query_iter(sql).await?;
        Ok(Box::new(MySqlRowCursor::new(result)))
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, DbError> {
        let count: Option<u64> = self
            .conn
            .exec_first(QUERY_TABLE_EXISTS_SQL, (table,))
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    async fn database_exists(&mut self, database: &str) -> Result<bool, DbError> {
        let count: Option<u64> = self
            .conn
            .exec_first(QUERY_DATABASE_EXISTS_SQL, (database,))
            .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError> {
        let rows: Vec<Vec<u8>> = self.conn.query("SHOW TABLES").await?;

        rows.into_iter()
            .map(|raw| {
                String::from_utf8(raw)
                    .map_err(|e| DbError::Unknown(format!("invalid UTF-8 in table name: {e}")))
            })
            .collect()
    }

    async fn table_field_meta(&mut self, table: &str) -> Result<TableFieldMetaInfo, DbError> {
        let rows: Vec<(Vec<u8>, Vec<u8>)> = self
            .conn
            .exec(QUERY_TABLE_COLUMNS_SQL, (table,))
            .await?;

        let fields = rows
            .into_iter()
            .enumerate()
            .map(|(ordinal, (name, data_type))| {
                let name = String::from_utf8(name)?;
                let data_type = String::from_utf8(data_type)?;
                Ok(FieldMetaInfo::new(
                    name,
                    ordinal,
                    DataType::from_mysql_type(&data_type),
                ))
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(TableFieldMetaInfo::new(table, fields))
    }
}
