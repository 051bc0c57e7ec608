use model::{core::constants::MAGIC_FIELD_SEPARATOR, execution::modes::RecordFormat};

/// Splits a raw record into fields using the convention of the reader that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordParser {
    /// Plain text split on the configured separator. No quoting.
    Delimited(String),
    /// Fields already unquoted by the CSV reader and joined with the magic separator.
    Magic,
}

impl RecordParser {
    pub fn for_format(format: RecordFormat, separator: &str) -> Self {
        match format {
            RecordFormat::Delimited => RecordParser::Delimited(separator.to_string()),
            RecordFormat::Csv => RecordParser::Magic,
        }
    }

    pub fn split<'a>(&self, record: &'a str) -> Vec<&'a str> {
        match self {
            RecordParser::Delimited(sep) => record.split(sep.as_str()).collect(),
            RecordParser::Magic => record.split(MAGIC_FIELD_SEPARATOR).collect(),
        }
    }

    /// Inverse of [`RecordParser::split`] for generated records.
    pub fn join(&self, fields: &[&str]) -> String {
        match self {
            RecordParser::Delimited(sep) => fields.join(sep),
            RecordParser::Magic => fields.join(MAGIC_FIELD_SEPARATOR),
        }
    }
}
