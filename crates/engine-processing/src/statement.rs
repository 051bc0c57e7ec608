use model::core::constants::NULL_MARKER;

/// A finished multi-row INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub sql: String,
    pub rows: u64,
}

/// Accumulates rows for one physical table into a single multi-row INSERT.
///
/// Every field is written as a quoted string literal and left to the server
/// to convert; the `\N` marker becomes `NULL`.
#[derive(Debug)]
pub struct InsertStatementBuilder {
    prefix: String,
    max_rows: usize,
    max_bytes: usize,
    sql: String,
    rows: usize,
}

impl InsertStatementBuilder {
    pub fn new(table: &str, ignore: bool, max_rows: usize, max_bytes: usize) -> Self {
        let prefix = format!(
            "INSERT {}INTO {} VALUES ",
            if ignore { "IGNORE " } else { "" },
            quote_identifier(table)
        );
        Self {
            sql: String::with_capacity(prefix.len() + 256),
            prefix,
            max_rows: max_rows.max(1),
            max_bytes: max_bytes.max(1),
            rows: 0,
        }
    }

    /// Appends one row. Returns `true` when a size threshold is reached and
    /// the statement should be taken.
    pub fn push_row(&mut self, fields: &[&str]) -> bool {
        if self.rows == 0 {
            self.sql.clear();
            self.sql.push_str(&self.prefix);
        } else {
            self.sql.push(',');
        }

        self.sql.push('(');
        for (idx, field) in fields.iter().enumerate() {
            if idx > 0 {
                self.sql.push(',');
            }
            if *field == NULL_MARKER {
                self.sql.push_str("NULL");
            } else {
                self.sql.push('\'');
                escape_into(&mut self.sql, field);
                self.sql.push('\'');
            }
        }
        self.sql.push(')');
        self.rows += 1;

        self.rows >= self.max_rows || self.sql.len() >= self.max_bytes
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Hands out the pending statement and resets the builder.
    pub fn take(&mut self) -> Option<InsertStatement> {
        if self.rows == 0 {
            return None;
        }
        let rows = std::mem::take(&mut self.rows) as u64;
        Some(InsertStatement {
            sql: std::mem::take(&mut self.sql),
            rows,
        })
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
}
