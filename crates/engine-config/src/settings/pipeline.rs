use model::core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BUFFER_CAPACITY, DEFAULT_INSERT_BATCH_ROWS,
    DEFAULT_MAX_CSV_MULTILINE, DEFAULT_MAX_STATEMENT_BYTES,
};
use serde::{Deserialize, Serialize};

/// Worker counts and batch thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Records per row batch.
    pub batch_size: usize,
    /// Batch slots in the buffer between producers and consumers.
    pub buffer_capacity: usize,
    /// Upper bound on file readers per table.
    pub producers: usize,
    pub consumers: usize,
    pub insert_batch_rows: usize,
    pub max_statement_bytes: usize,
    pub max_csv_multiline: usize,
    /// Rows buffered by an export worker before each sink write.
    pub export_flush_rows: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            producers: 4,
            consumers: 4,
            insert_batch_rows: DEFAULT_INSERT_BATCH_ROWS,
            max_statement_bytes: DEFAULT_MAX_STATEMENT_BYTES,
            max_csv_multiline: DEFAULT_MAX_CSV_MULTILINE,
            export_flush_rows: DEFAULT_BATCH_SIZE,
        }
    }
}
