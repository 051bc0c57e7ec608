use model::execution::modes::DdlMode;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Explicit source files per table.
    pub files: BTreeMap<String, Vec<PathBuf>>,
    /// Directory scanned for `<table>*` files when a table has no explicit list.
    pub input_dir: Option<PathBuf>,
    pub ddl_mode: DdlMode,
    /// `;`-terminated DDL statements replayed before the import.
    pub ddl_file: Option<PathBuf>,
    pub drop_table_if_exists: bool,
    pub insert_ignore: bool,
    /// Parse and count rows without writing them.
    pub process_only: bool,
    /// Feed the synthetic generator instead of files.
    pub benchmark_rows: Option<u64>,
}
