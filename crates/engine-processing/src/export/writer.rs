use crate::export::masker::ColumnMaskers;
use connectors::sql::connection::RawRow;
use model::{
    core::constants::{CR_BYTE, DOUBLE_QUOTE_BYTE, LF_BYTE, NULL_MARKER},
    execution::modes::QuoteMode,
};

/// Serializes result rows into separator-delimited lines.
///
/// Under [`QuoteMode::Auto`] the column masker runs first, then a value is
/// quoted only when its column is string-typed and the masked value contains
/// the separator, CR, LF or `"`. `None` and `Force` write raw values. Quotes inside quoted values are doubled. SQL NULL is written
/// as `\N` and never quoted.
#[derive(Clone)]
pub struct FieldWriter {
    mode: QuoteMode,
    separator: Vec<u8>,
    string_columns: Vec<bool>,
    maskers: ColumnMaskers,
    with_last_sep: bool,
}

impl FieldWriter {
    pub fn new(mode: QuoteMode, separator: &str, string_columns: Vec<bool>) -> Self {
        Self {
            mode,
            separator: separator.as_bytes().to_vec(),
            string_columns,
            maskers: ColumnMaskers::default(),
            with_last_sep: false,
        }
    }

    pub fn with_maskers(mut self, maskers: ColumnMaskers) -> Self {
        self.maskers = maskers;
        self
    }

    pub fn with_last_sep(mut self, with_last_sep: bool) -> Self {
        self.with_last_sep = with_last_sep;
        self
    }

    pub fn write_row(&self, out: &mut Vec<u8>, row: &RawRow) {
        for (idx, value) in row.iter().enumerate() {
            if idx > 0 {
                out.extend_from_slice(&self.separator);
            }
            self.write_field(out, value.as_deref(), idx);
        }
        if self.with_last_sep {
            out.extend_from_slice(&self.separator);
        }
        out.push(LF_BYTE);
    }

    fn write_field(&self, out: &mut Vec<u8>, value: Option<&[u8]>, idx: usize) {
        let Some(value) = value else {
            out.extend_from_slice(NULL_MARKER.as_bytes());
            return;
        };

        let masked;
        let (value, quote) = match self.mode {
            QuoteMode::None => (value, false),
            QuoteMode::Force => (value, true),
            QuoteMode::Auto => {
                let value = match self.maskers.get(idx) {
                    Some(masker) => {
                        masked = masker.mask(value);
                        masked.as_slice()
                    }
                    None => value,
                };
                let string_column = self.string_columns.get(idx).copied().unwrap_or(true);
                (value, string_column && self.needs_quote(value))
            }
        };

        if quote {
            write_quoted(out, value);
        } else {
            out.extend_from_slice(value);
        }
    }

    fn needs_quote(&self, value: &[u8]) -> bool {
        value
            .iter()
            .any(|b| matches!(*b, CR_BYTE | LF_BYTE | DOUBLE_QUOTE_BYTE))
            || contains(value, &self.separator)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

fn write_quoted(out: &mut Vec<u8>, value: &[u8]) {
    out.push(DOUBLE_QUOTE_BYTE);
    for &b in value {
        if b == DOUBLE_QUOTE_BYTE {
            out.push(DOUBLE_QUOTE_BYTE);
        }
        out.push(b);
    }
    out.push(DOUBLE_QUOTE_BYTE);
}
