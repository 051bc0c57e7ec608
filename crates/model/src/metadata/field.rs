use crate::core::data_type::DataType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetaInfo {
    pub name: String,
    /// Zero-based position in the table's column order.
    pub ordinal: usize,
    pub data_type: DataType,
}

impl FieldMetaInfo {
    pub fn new(name: impl Into<String>, ordinal: usize, data_type: DataType) -> Self {
        FieldMetaInfo {
            name: name.into(),
            ordinal,
            data_type,
        }
    }

    pub fn is_string(&self) -> bool {
        self.data_type.is_string_like()
    }
}

/// Ordered column descriptions of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFieldMetaInfo {
    pub table: String,
    pub fields: Vec<FieldMetaInfo>,
}

impl TableFieldMetaInfo {
    pub fn new(table: impl Into<String>, fields: Vec<FieldMetaInfo>) -> Self {
        TableFieldMetaInfo {
            table: table.into(),
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of `column` in this field list, matched case-insensitively.
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(column))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn string_flags(&self) -> Vec<bool> {
        self.fields.iter().map(FieldMetaInfo::is_string).collect()
    }

    /// Restricts and reorders the field list to `columns`. Returns the name of
    /// the first column that does not exist.
    pub fn project(&self, columns: &[String]) -> Result<TableFieldMetaInfo, String> {
        let fields = columns
            .iter()
            .enumerate()
            .map(|(ordinal, column)| {
                self.position_of(column)
                    .map(|idx| FieldMetaInfo {
                        ordinal,
                        ..self.fields[idx].clone()
                    })
                    .ok_or_else(|| column.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TableFieldMetaInfo::new(self.table.clone(), fields))
    }
}
