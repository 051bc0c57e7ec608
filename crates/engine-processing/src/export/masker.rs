use crate::error::ExportError;
use model::metadata::field::TableFieldMetaInfo;
use std::sync::Arc;

/// Pure per-value transformation applied to one column during export.
pub trait DataMasker: Send + Sync {
    fn mask(&self, value: &[u8]) -> Vec<u8>;
}

/// Replaces every value with a fixed token.
#[derive(Debug, Clone)]
pub struct RedactMasker {
    token: Vec<u8>,
}

impl RedactMasker {
    pub fn new(token: impl Into<Vec<u8>>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Default for RedactMasker {
    fn default() -> Self {
        Self::new("******")
    }
}

impl DataMasker for RedactMasker {
    fn mask(&self, _value: &[u8]) -> Vec<u8> {
        self.token.clone()
    }
}

/// Maskers indexed by column position.
#[derive(Clone, Default)]
pub struct ColumnMaskers {
    by_position: Vec<Option<Arc<dyn DataMasker>>>,
}

impl ColumnMaskers {
    pub fn new(columns: usize) -> Self {
        Self {
            by_position: vec![None; columns],
        }
    }

    /// Binds `masker` to `column`. Unknown columns are rejected.
    pub fn register(
        &mut self,
        meta: &TableFieldMetaInfo,
        column: &str,
        masker: Arc<dyn DataMasker>,
    ) -> Result<(), ExportError> {
        let position = meta
            .position_of(column)
            .ok_or_else(|| ExportError::UnknownMaskColumn(column.to_string()))?;
        if self.by_position.len() <= position {
            self.by_position.resize(position + 1, None);
        }
        self.by_position[position] = Some(masker);
        Ok(())
    }

    pub fn get(&self, position: usize) -> Option<&dyn DataMasker> {
        self.by_position.get(position)?.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.iter().all(Option::is_none)
    }
}
