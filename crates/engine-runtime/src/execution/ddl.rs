use connectors::sql::{
    connection::{ConnectionSource, DbConnection},
    error::DbError,
};
use engine_processing::statement::quote_identifier;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DdlError {
    #[error("Cannot read DDL file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} '{name}' already exists on the target")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("DDL statement failed ({statement}): {source}")]
    Execute {
        statement: String,
        #[source]
        source: DbError,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Object created by a DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlObject {
    Database(String),
    Table(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlStatement {
    pub sql: String,
    pub object: DdlObject,
    pub if_not_exists: bool,
}

impl DdlStatement {
    pub fn parse(sql: &str) -> Self {
        let sql = sql.trim().to_string();
        let (object, if_not_exists) = classify(&sql);
        Self {
            sql,
            object,
            if_not_exists,
        }
    }
}

pub fn load_ddl_file(path: &Path) -> Result<Vec<DdlStatement>, DdlError> {
    let text = std::fs::read_to_string(path).map_err(|source| DdlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_statements(&text))
}

/// Splits a script into `;`-terminated statements. `--` line comments are
/// dropped and semicolons inside quotes are kept.
pub fn split_statements(text: &str) -> Vec<DdlStatement> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim_start().starts_with("--") {
            continue;
        }

        let mut quote: Option<char> = None;
        for ch in line.chars() {
            match (quote, ch) {
                (None, ';') => {
                    if !current.trim().is_empty() {
                        statements.push(DdlStatement::parse(&current));
                    }
                    current.clear();
                    continue;
                }
                (None, '\'' | '"' | '`') => quote = Some(ch),
                (Some(q), c) if c == q => quote = None,
                _ => {}
            }
            current.push(ch);
        }
        current.push('\n');
    }

    if !current.trim().is_empty() {
        statements.push(DdlStatement::parse(&current));
    }
    statements
}

fn classify(sql: &str) -> (DdlObject, bool) {
    let upper = sql.to_uppercase();
    let words: Vec<&str> = upper.split_whitespace().collect();
    let original: Vec<&str> = sql.split_whitespace().collect();

    if words.first() != Some(&"CREATE") {
        return (DdlObject::Other, false);
    }

    let mut pos = 1;
    if words.get(pos) == Some(&"TEMPORARY") {
        pos += 1;
    }
    let kind = match words.get(pos) {
        Some(&"DATABASE") | Some(&"SCHEMA") => "DATABASE",
        Some(&"TABLE") => "TABLE",
        _ => return (DdlObject::Other, false),
    };
    pos += 1;

    let if_not_exists = words.get(pos..pos + 3) == Some(&["IF", "NOT", "EXISTS"][..]);
    if if_not_exists {
        pos += 3;
    }

    let Some(raw_name) = original.get(pos) else {
        return (DdlObject::Other, if_not_exists);
    };
    let name = object_name(raw_name);

    match kind {
        "DATABASE" => (DdlObject::Database(name), if_not_exists),
        _ => (DdlObject::Table(name), if_not_exists),
    }
}

/// `` `db`.`t`(id int`` → `t`
fn object_name(raw: &str) -> String {
    let raw = raw.split('(').next().unwrap_or(raw);
    let last = raw.rsplit('.').next().unwrap_or(raw);
    last.trim_matches('`').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DdlReport {
    pub executed: usize,
    pub created_databases: Vec<String>,
    pub created_tables: Vec<String>,
    pub dropped_tables: Vec<String>,
}

/// Replays DDL statements in order on one connection.
///
/// Creating an object that already exists fails fast, unless the statement
/// says `IF NOT EXISTS`, or it is a table and dropping existing tables was
/// requested.
pub struct DdlReplicator {
    source: Arc<dyn ConnectionSource>,
    drop_if_exists: bool,
}

impl DdlReplicator {
    pub fn new(source: Arc<dyn ConnectionSource>, drop_if_exists: bool) -> Self {
        Self {
            source,
            drop_if_exists,
        }
    }

    pub async fn replicate(&self, statements: &[DdlStatement]) -> Result<DdlReport, DdlError> {
        let mut conn = self.source.connect().await?;
        let mut report = DdlReport::default();

        for stmt in statements {
            self.check_conflict(conn.as_mut(), stmt, &mut report).await?;

            debug!(statement = %stmt.sql, "Executing DDL");
            conn.execute(&stmt.sql)
                .await
                .map_err(|source| DdlError::Execute {
                    statement: abbreviate(&stmt.sql),
                    source,
                })?;
            report.executed += 1;

            match &stmt.object {
                DdlObject::Database(name) => report.created_databases.push(name.clone()),
                DdlObject::Table(name) => report.created_tables.push(name.clone()),
                DdlObject::Other => {}
            }
        }

        info!(
            executed = report.executed,
            tables = report.created_tables.len(),
            dropped = report.dropped_tables.len(),
            "DDL replicated"
        );
        Ok(report)
    }

    async fn check_conflict(
        &self,
        conn: &mut dyn DbConnection,
        stmt: &DdlStatement,
        report: &mut DdlReport,
    ) -> Result<(), DdlError> {
        if stmt.if_not_exists {
            return Ok(());
        }

        match &stmt.object {
            DdlObject::Database(name) => {
                if conn.database_exists(name).await? {
                    return Err(DdlError::AlreadyExists {
                        kind: "Database",
                        name: name.clone(),
                    });
                }
            }
            DdlObject::Table(name) => {
                if conn.table_exists(name).await? {
                    if !self.drop_if_exists {
                        return Err(DdlError::AlreadyExists {
                            kind: "Table",
                            name: name.clone(),
                        });
                    }
                    warn!(table = %name, "Dropping existing table before create");
                    let drop_sql = format!("DROP TABLE {}", quote_identifier(name));
                    conn.execute(&drop_sql)
                        .await
                        .map_err(|source| DdlError::Execute {
                            statement: drop_sql.clone(),
                            source,
                        })?;
                    report.dropped_tables.push(name.clone());
                }
            }
            DdlObject::Other => {}
        }
        Ok(())
    }
}

fn abbreviate(sql: &str) -> String {
    const MAX: usize = 80;
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_script_and_skips_comments() {
        let script = "-- header\nCREATE DATABASE IF NOT EXISTS shop;\nUSE shop;\n\
                      CREATE TABLE `orders` (\n  id INT,\n  note VARCHAR(10) DEFAULT 'a;b'\n);\n";
        let statements = split_statements(script);

        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0].object, DdlObject::Database("shop".into()));
        assert!(statements[0].if_not_exists);
        assert_eq!(statements[1].object, DdlObject::Other);
        assert_eq!(statements[2].object, DdlObject::Table("orders".into()));
        assert!(!statements[2].if_not_exists);
        assert!(statements[2].sql.contains("'a;b'"));
    }

    #[test]
    fn classifies_qualified_and_inline_names() {
        assert_eq!(
            DdlStatement::parse("create table `shop`.`items`(id int)").object,
            DdlObject::Table("items".into())
        );
        assert_eq!(
            DdlStatement::parse("CREATE TEMPORARY TABLE IF NOT EXISTS tmp (x int)"),
            DdlStatement {
                sql: "CREATE TEMPORARY TABLE IF NOT EXISTS tmp (x int)".into(),
                object: DdlObject::Table("tmp".into()),
                if_not_exists: true,
            }
        );
        assert_eq!(
            DdlStatement::parse("CREATE INDEX i ON t (x)").object,
            DdlObject::Other
        );
    }

    #[test]
    fn long_statements_are_abbreviated() {
        let sql = format!("CREATE TABLE t ({})", "x INT, ".repeat(40));
        let short = abbreviate(&sql);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 83);
    }
}
