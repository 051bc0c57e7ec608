use crate::memory::MemoryRow;
use engine_config::report::summary::{RunSummary, TableStatus};
use std::str::Chars;

/// Parses a multi-row `INSERT [IGNORE] INTO `t` VALUES (...),(...)` as built by
/// the statement builder back into rows. `NULL` becomes `None`.
pub fn parse_insert(sql: &str) -> Option<(String, Vec<MemoryRow>)> {
    let rest = sql.strip_prefix("INSERT ")?;
    let rest = rest.strip_prefix("IGNORE ").unwrap_or(rest);
    let rest = rest.strip_prefix("INTO ")?;
    let (table, values) = rest.split_once(" VALUES ")?;
    let table = table.trim().trim_matches('`').replace("``", "`");

    let mut chars = values.chars();
    let mut rows = Vec::new();
    while let Some(c) = chars.next() {
        match c {
            '(' => rows.push(parse_tuple(&mut chars)?),
            ',' | ' ' => {}
            _ => return None,
        }
    }
    Some((table, rows))
}

fn parse_tuple(chars: &mut Chars<'_>) -> Option<MemoryRow> {
    let mut row = Vec::new();
    loop {
        match chars.next()? {
            '\'' => row.push(Some(parse_literal(chars)?)),
            'N' => {
                for expected in ['U', 'L', 'L'] {
                    if chars.next()? != expected {
                        return None;
                    }
                }
                row.push(None);
            }
            _ => return None,
        }
        match chars.next()? {
            ',' => continue,
            ')' => return Some(row),
            _ => return None,
        }
    }
}

fn parse_literal(chars: &mut Chars<'_>) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => out.push(match chars.next()? {
                'n' => '\n',
                'r' => '\r',
                '0' => '\0',
                'Z' => '\x1a',
                other => other,
            }),
            '\'' => return Some(out),
            c => out.push(c),
        }
    }
}

/// Builds expected rows from string literals; `\N` stands for NULL.
pub fn rows(values: &[&[&str]]) -> Vec<MemoryRow> {
    values
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| (*v != "\\N").then(|| v.to_string()))
                .collect()
        })
        .collect()
}

/// Rows sorted by their first column parsed as an integer.
pub fn sorted_by_id(mut rows: Vec<MemoryRow>) -> Vec<MemoryRow> {
    rows.sort_by_key(|row| {
        row.first()
            .cloned()
            .flatten()
            .and_then(|id| id.parse::<i64>().ok())
    });
    rows
}

pub fn assert_table_status(summary: &RunSummary, table: &str, status: TableStatus) {
    let entry = summary
        .table(table)
        .unwrap_or_else(|| panic!("no summary for table '{table}'"));
    assert_eq!(
        entry.status, status,
        "expected table '{table}' to be {status:?}, summary: {entry:?}"
    );
}

/// Rows published, rows consumed and rows written all equal `expected`.
pub fn assert_conserved(summary: &RunSummary, table: &str, expected: u64) {
    let entry = summary
        .table(table)
        .unwrap_or_else(|| panic!("no summary for table '{table}'"));
    assert_eq!(entry.rows_emitted, expected, "rows emitted for '{table}'");
    assert_eq!(entry.rows_consumed, expected, "rows consumed for '{table}'");
    assert_eq!(entry.rows_written, expected, "rows written for '{table}'");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builder_output() {
        let (table, parsed) =
            parse_insert("INSERT IGNORE INTO `t` VALUES ('1','it\\'s'),('2',NULL),('3','a\\nb')").unwrap();
        assert_eq!(table, "t");
        assert_eq!(
            parsed,
            vec![
                vec![Some("1".into()), Some("it's".into())],
                vec![Some("2".into()), None],
                vec![Some("3".into()), Some("a\nb".into())],
            ]
        );
    }

    #[test]
    fn rejects_other_statements() {
        assert!(parse_insert("CREATE TABLE t (id int)").is_none());
    }
}
