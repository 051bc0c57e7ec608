use engine_core::metrics::{FileReaderStat, MetricsSnapshot};
use serde::Serialize;
use std::fmt::Display;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Succeeded,
    Failed,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReaderSummary {
    pub source_index: usize,
    pub path: String,
    pub lines: u64,
    pub records: u64,
    pub elapsed_ms: u64,
}

impl From<&FileReaderStat> for ReaderSummary {
    fn from(stat: &FileReaderStat) -> Self {
        Self {
            source_index: stat.source_index,
            path: stat.path.clone(),
            lines: stat.lines,
            records: stat.records,
            elapsed_ms: stat.elapsed.as_millis() as u64,
        }
    }
}

/// Outcome of one table. Row counts of a failed table are whatever made it
/// through before the failure.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: String,
    pub status: TableStatus,
    pub rows_emitted: u64,
    pub rows_consumed: u64,
    pub rows_written: u64,
    pub batches: u64,
    pub bytes_written: u64,
    pub failures: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub readers: Vec<ReaderSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableSummary {
    pub fn new<E: Display>(
        table: &str,
        metrics: &MetricsSnapshot,
        readers: &[FileReaderStat],
        error: Option<&E>,
    ) -> Self {
        Self {
            table: table.to_string(),
            status: if error.is_some() {
                TableStatus::Failed
            } else {
                TableStatus::Succeeded
            },
            rows_emitted: metrics.rows_emitted,
            rows_consumed: metrics.rows_consumed,
            rows_written: metrics.rows_written,
            batches: metrics.batches_emitted,
            bytes_written: metrics.bytes_written,
            failures: metrics.failure_count,
            readers: readers.iter().map(ReaderSummary::from).collect(),
            error: error.map(ToString::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TableStatus::Succeeded
    }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub command: String,
    pub tables: Vec<TableSummary>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, table: TableSummary) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn total_rows_written(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    pub fn failed_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| !t.is_success())
            .map(|t| t.table.as_str())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.tables.iter().all(TableSummary::is_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn summary_serializes_counts_and_failures() {
        let metrics = MetricsSnapshot {
            rows_emitted: 7,
            batches_emitted: 3,
            rows_consumed: 7,
            rows_written: 7,
            ..Default::default()
        };
        let readers = [FileReaderStat {
            source_index: 0,
            path: "t.csv".into(),
            lines: 7,
            records: 7,
            elapsed: Duration::from_millis(12),
        }];

        let mut run = RunSummary::new("import");
        run.push(TableSummary::new::<String>("t", &metrics, &readers, None));
        run.push(TableSummary::new("u", &MetricsSnapshot::default(), &[], Some(&"boom")));

        assert!(!run.is_success());
        assert_eq!(run.failed_tables(), vec!["u"]);
        assert_eq!(run.total_rows_written(), 7);

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["tables"][0]["status"], "SUCCEEDED");
        assert_eq!(json["tables"][0]["batches"], 3);
        assert_eq!(json["tables"][0]["readers"][0]["elapsed_ms"], 12);
        assert_eq!(json["tables"][1]["error"], "boom");
        assert!(json["tables"][1].get("readers").is_none());
    }
}
