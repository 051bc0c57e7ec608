use crate::sql::{
    connection::{RawRow, RowCursor},
    error::DbError,
};
use async_trait::async_trait;
use mysql_async::{QueryResult, Row, TextProtocol, Value};

/// Streaming text-protocol result set borrowed from a [`super::adapter::MySqlAdapter`].
pub struct MySqlRowCursor<'a> {
    result: QueryResult<'a, 'static, TextProtocol>,
    columns: usize,
}

impl<'a> MySqlRowCursor<'a> {
    pub fn new(result: QueryResult<'a, 'static, TextProtocol>) -> Self {
        let columns = result.columns_ref().len();
        Self { result, columns }
    }
}

#[async_trait]
impl RowCursor for MySqlRowCursor<'_> {
    fn column_count(&self) -> usize {
        self.columns
    }

    async fn next_row(&mut self) -> Result<Option<RawRow>, DbError> {
        match self.result.next().await? {
            Some(row) => Ok(Some(row_to_raw(&row))),
            None => Ok(None),
        }
    }
}

fn row_to_raw(row: &Row) -> RawRow {
    (0..row.len())
        .map(|idx| row.as_ref(idx).and_then(value_bytes))
        .collect()
}

/// Text protocol rows arrive as `Bytes`; the numeric arms only matter for
/// values synthesized by the driver.
fn value_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(bytes.clone()),
        Value::Int(v) => Some(v.to_string().into_bytes()),
        Value::UInt(v) => Some(v.to_string().into_bytes()),
        Value::Float(v) => Some(v.to_string().into_bytes()),
        Value::Double(v) => Some(v.to_string().into_bytes()),
        other => Some(other.as_sql(true).trim_matches('\'').as_bytes().to_vec()),
    }
}
