use model::execution::modes::{CompressMode, EncryptionMode, FileFormat};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub compress: CompressMode,
    pub encryption: EncryptionMode,
    pub file_format: FileFormat,
    /// Column subset per table. Missing tables export every column.
    pub columns: BTreeMap<String, Vec<String>>,
    /// Appended as `WHERE <filter>` to every export query.
    pub where_clause: Option<String>,
    /// Columns per table replaced by the built-in redaction masker.
    pub mask_columns: BTreeMap<String, Vec<String>>,
    /// Split partitioned tables into one file per shard.
    pub per_shard: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: String::new(),
            compress: CompressMode::None,
            encryption: EncryptionMode::None,
            file_format: FileFormat::None,
            columns: BTreeMap::new(),
            where_clause: None,
            mask_columns: BTreeMap::new(),
            per_shard: true,
        }
    }
}
