use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

#[derive(Debug, Default)]
struct InnerMetrics {
    rows_emitted: AtomicU64,
    batches_emitted: AtomicU64,
    rows_consumed: AtomicU64,
    batches_consumed: AtomicU64,
    rows_written: AtomicU64,
    bytes_written: AtomicU64,
    failure_count: AtomicU64,
}

/// Row counters of one table. Cloning shares the counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rows_emitted: u64,
    pub batches_emitted: u64,
    pub rows_consumed: u64,
    pub batches_consumed: u64,
    pub rows_written: u64,
    pub bytes_written: u64,
    pub failure_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    /// A producer published a batch holding `rows` records.
    pub fn record_emitted(&self, rows: u64) {
        self.inner.rows_emitted.fetch_add(rows, Ordering::Relaxed);
        self.inner.batches_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// A consumer finished handling a batch holding `rows` records.
    pub fn record_consumed(&self, rows: u64) {
        self.inner.rows_consumed.fetch_add(rows, Ordering::Relaxed);
        self.inner.batches_consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_written(&self, rows: u64) {
        self.inner.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_bytes(&self, bytes: u64) {
        self.inner.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.failure_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_emitted: self.inner.rows_emitted.load(Ordering::Relaxed),
            batches_emitted: self.inner.batches_emitted.load(Ordering::Relaxed),
            rows_consumed: self.inner.rows_consumed.load(Ordering::Relaxed),
            batches_consumed: self.inner.batches_consumed.load(Ordering::Relaxed),
            rows_written: self.inner.rows_written.load(Ordering::Relaxed),
            bytes_written: self.inner.bytes_written.load(Ordering::Relaxed),
            failure_count: self.inner.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines read and time spent by one file reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReaderStat {
    pub source_index: usize,
    pub path: String,
    pub lines: u64,
    pub records: u64,
    pub elapsed: Duration,
}

/// Per-table counters for runs touching several tables at once (exports).
#[derive(Debug, Default)]
pub struct TableMetrics {
    tables: Mutex<BTreeMap<String, Metrics>>,
}

impl TableMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of `table`, created on first use.
    pub fn for_table(&self, table: &str) -> Metrics {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .clone()
    }

    pub fn snapshot(&self) -> BTreeMap<String, MetricsSnapshot> {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(table, metrics)| (table.clone(), metrics.snapshot()))
            .collect()
    }
}
