#[cfg(test)]
mod tests {
    use crate::{
        TEST_URL, job,
        memory::{DEFAULT_TARGET, MemoryDatabase},
        utils::{assert_table_status, rows, sorted_by_id},
    };
    use engine_config::report::summary::TableStatus;
    use engine_processing::{error::ExportError, export::masker::DataMasker};
    use engine_runtime::{
        error::TransferError,
        execution::{export::ExportExecutor, import::ImportExecutor},
    };
    use flate2::read::GzDecoder;
    use model::core::data_type::DataType;
    use serde_json::json;
    use std::{io::Read, sync::Arc};
    use tempfile::tempdir;
    use tracing_test::traced_test;

    const NOTES: [(&str, DataType); 3] = [
        ("id", DataType::Int),
        ("note", DataType::VarChar),
        ("amount", DataType::Decimal),
    ];

    /// Hides the local part of an address, keeping punctuation.
    struct LocalPartMasker;

    impl DataMasker for LocalPartMasker {
        fn mask(&self, value: &[u8]) -> Vec<u8> {
            let at = value.iter().position(|b| *b == b'@').unwrap_or(value.len());
            value
                .iter()
                .enumerate()
                .map(|(i, b)| if i < at && b.is_ascii_alphanumeric() { b'*' } else { *b })
                .collect()
        }
    }

    fn users() -> MemoryDatabase {
        let db = MemoryDatabase::new().with_table(
            DEFAULT_TARGET,
            "users",
            &[("id", DataType::Int), ("email", DataType::VarChar)],
        );
        db.insert_rows(DEFAULT_TARGET, "users", rows(&[&["1", "a,b@x.com"], &["2", "c@y.org"]]));
        db
    }

    // Scenario: string values holding the separator, quotes, CR, LF, NULL and
    // the empty string, exported with AUTO quoting and imported back as CSV.
    // Expected Outcome: the imported rows equal the source rows.
    #[traced_test]
    #[tokio::test]
    async fn auto_quoting_round_trips_through_csv() {
        let dir = tempdir().unwrap();
        let source_rows = rows(&[
            &["1", "plain", "1.50"],
            &["2", "a,b", "2.00"],
            &["3", "say \"hi\"", "3.00"],
            &["4", "line\nbreak", "4.00"],
            &["5", "cr\rhere", "5.00"],
            &["6", "\\N", "6.00"],
            &["7", "", "7.00"],
        ]);
        let db = MemoryDatabase::new()
            .with_table(DEFAULT_TARGET, "src", &NOTES)
            .with_table(DEFAULT_TARGET, "dst", &NOTES);
        db.insert_rows(DEFAULT_TARGET, "src", source_rows.clone());

        let export = job(&json!({
            "url": TEST_URL,
            "tables": ["src"],
            "format": { "separator": ",", "record_format": "CSV", "quote": "AUTO" },
            "export": { "output_dir": dir.path(), "prefix": "dump_" },
            "pipeline": { "export_flush_rows": 3 }
        })
        .to_string());
        let summary = ExportExecutor::from_config(export, db.source())
            .unwrap()
            .execute()
            .await
            .unwrap();
        assert_eq!(summary.table("src").unwrap().rows_written, 7);

        let file = dir.path().join("dump_src_0");
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.starts_with("1,plain,1.50\n2,\"a,b\",2.00\n3,\"say \"\"hi\"\"\",3.00\n"));
        assert!(text.contains("6,\\N,6.00\n"));

        let import = job(&json!({
            "url": TEST_URL,
            "tables": ["dst"],
            "format": { "separator": ",", "record_format": "CSV" },
            "import": { "files": { "dst": [file] } },
            "pipeline": { "batch_size": 2, "consumers": 2 }
        })
        .to_string());
        ImportExecutor::new(import, db.source())
            .unwrap()
            .execute()
            .await
            .unwrap();

        assert_eq!(sorted_by_id(db.rows(DEFAULT_TARGET, "dst")), source_rows);
    }

    // Scenario: masker on `email`, AUTO quoting, value `a,b@x.com`.
    // Expected Outcome: the value is masked first, then quoted because the
    // masked value still holds the separator.
    #[traced_test]
    #[tokio::test]
    async fn masking_runs_before_quoting() {
        let dir = tempdir().unwrap();
        let db = users();

        let config = job(&json!({
            "url": TEST_URL,
            "tables": ["users"],
            "export": { "output_dir": dir.path() }
        })
        .to_string());
        ExportExecutor::from_config(config, db.source())
            .unwrap()
            .with_masker("users", "email", Arc::new(LocalPartMasker))
            .execute()
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("users_0")).unwrap();
        assert_eq!(text, "1,\"*,*@x.com\"\n2,*@y.org\n");
    }

    // Scenario: configured mask column, projection to one column, AUTO
    // quoting, trailing separator and a WHERE filter.
    // Expected Outcome: redacted values, only the projected column, and the
    // filter forwarded in the query.
    #[traced_test]
    #[tokio::test]
    async fn configured_masks_and_projection() {
        let dir = tempdir().unwrap();
        let db = users();

        let config = job(&json!({
            "url": TEST_URL,
            "tables": ["users"],
            "format": { "separator": "|", "quote": "AUTO", "with_last_sep": true },
            "export": {
                "output_dir": dir.path(),
                "columns": { "users": ["email"] },
                "mask_columns": { "users": ["email"] },
                "where_clause": "id > 0"
            }
        })
        .to_string());
        ExportExecutor::from_config(config, db.source())
            .unwrap()
            .execute()
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("users_0")).unwrap();
        assert_eq!(text, "******|\n******|\n");

        let queries: Vec<String> = db
            .executed()
            .into_iter()
            .map(|(_, sql)| sql)
            .filter(|sql| sql.starts_with("SELECT"))
            .collect();
        assert_eq!(queries, vec!["SELECT `email` FROM `users` WHERE id > 0"]);
    }

    // Scenario: a configured mask column exported with FORCE quoting.
    // Expected Outcome: values are quoted but written unmasked.
    #[traced_test]
    #[tokio::test]
    async fn force_quoting_skips_maskers() {
        let dir = tempdir().unwrap();
        let db = users();

        let config = job(&json!({
            "url": TEST_URL,
            "tables": ["users"],
            "format": { "separator": "|", "quote": "FORCE" },
            "export": {
                "output_dir": dir.path(),
                "mask_columns": { "users": ["email"] }
            }
        })
        .to_string());
        ExportExecutor::from_config(config, db.source())
            .unwrap()
            .execute()
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("users_0")).unwrap();
        assert_eq!(text, "\"1\"|\"a,b@x.com\"\n\"2\"|\"c@y.org\"\n");
    }

    // Scenario: a mask registered on a column the table does not have.
    // Expected Outcome: configuration error before any file is written.
    #[traced_test]
    #[tokio::test]
    async fn unknown_mask_column_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let db = users();

        let config = job(&json!({
            "url": TEST_URL,
            "tables": ["users"],
            "export": { "output_dir": dir.path(), "mask_columns": { "users": ["phone"] } }
        })
        .to_string());
        let err = ExportExecutor::from_config(config, db.source())
            .unwrap()
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::Export(ExportError::UnknownMaskColumn(ref c)) if c == "phone"
        ));
        assert!(!dir.path().join("users_0").exists());
        assert_eq!(db.shutdowns(), 1);
    }

    fn sharded_orders() -> MemoryDatabase {
        let columns = [("id", DataType::Int), ("name", DataType::VarChar)];
        let db = MemoryDatabase::new()
            .with_table("a", "orders_0", &columns)
            .with_table("b", "orders_1", &columns);
        db.insert_rows("a", "orders_0", rows(&[&["2", "x"], &["4", "y"]]));
        db.insert_rows("b", "orders_1", rows(&[&["1", "z"]]));
        db
    }

    fn sharded_export_job(dir: &std::path::Path) -> String {
        json!({
            "url": TEST_URL,
            "tables": ["orders"],
            "export": { "output_dir": dir, "compress": "GZIP" },
            "topology": [{
                "logical_table": "orders",
                "shards": [
                    { "shard_id": "a", "url": TEST_URL, "physical_table": "orders_0" },
                    { "shard_id": "b", "url": TEST_URL, "physical_table": "orders_1" }
                ],
                "partition": { "column_index": 0, "rule": { "kind": "modulo" } }
            }]
        })
        .to_string()
    }

    fn gunzip(path: &std::path::Path) -> String {
        let mut text = String::new();
        GzDecoder::new(std::fs::File::open(path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    // Scenario: sharded table exported with gzip compression.
    // Expected Outcome: one compressed file per physical shard.
    #[traced_test]
    #[tokio::test]
    async fn one_compressed_file_per_shard() {
        let dir = tempdir().unwrap();
        let db = sharded_orders();

        let summary = ExportExecutor::from_config(job(&sharded_export_job(dir.path())), db.source())
            .unwrap()
            .execute()
            .await
            .unwrap();

        assert_eq!(summary.table("orders").unwrap().rows_written, 3);
        assert_eq!(gunzip(&dir.path().join("orders_0.gz")), "2,x\n4,y\n");
        assert_eq!(gunzip(&dir.path().join("orders_1.gz")), "1,z\n");
    }

    // Scenario: one shard's physical table disappeared after planning.
    // Expected Outcome: the failing shard is reported, the other shard's
    // file is complete and its rows are counted.
    #[traced_test]
    #[tokio::test]
    async fn shard_failure_keeps_completed_output() {
        let dir = tempdir().unwrap();
        let columns = [("id", DataType::Int), ("name", DataType::VarChar)];
        let db = MemoryDatabase::new().with_table("a", "orders_0", &columns);
        db.insert_rows("a", "orders_0", rows(&[&["2", "x"], &["4", "y"]]));

        let err = ExportExecutor::from_config(job(&sharded_export_job(dir.path())), db.source())
            .unwrap()
            .execute()
            .await
            .unwrap_err();

        let summary = err.summary().expect("summary of the failed run");
        assert_table_status(summary, "orders", TableStatus::Failed);
        assert_eq!(summary.table("orders").unwrap().rows_written, 2);
        assert!(summary.table("orders").unwrap().error.as_deref().unwrap().contains("orders_1"));
        assert_eq!(gunzip(&dir.path().join("orders_0.gz")), "2,x\n4,y\n");
    }
}
