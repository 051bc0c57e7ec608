use crate::statement::quote_identifier;

/// `SELECT` used by an export worker. An empty column list selects `*`.
pub fn build_export_sql(table: &str, columns: &[String], filter: Option<&str>) -> String {
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",")
    };

    let mut sql = format!("SELECT {} FROM {}", projection, quote_identifier(table));
    if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::build_export_sql;

    #[test]
    fn builds_projection_and_filter() {
        assert_eq!(build_export_sql("t", &[], None), "SELECT * FROM `t`");
        assert_eq!(
            build_export_sql("t", &["id".into(), "name".into()], Some(" id > 5 ")),
            "SELECT `id`,`name` FROM `t` WHERE id > 5"
        );
        assert_eq!(build_export_sql("t", &[], Some("  ")), "SELECT * FROM `t`");
    }
}
