use model::{
    core::constants::DEFAULT_SEPARATOR,
    execution::modes::{Charset, QuoteMode, RecordFormat},
};
use serde::{Deserialize, Serialize};

/// Flat-file layout shared by import and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    pub separator: String,
    pub record_format: RecordFormat,
    pub charset: Charset,
    /// First line of each import file is a header and is skipped.
    pub with_header: bool,
    pub quote: QuoteMode,
    /// Export rows end with a separator before the line break.
    pub with_last_sep: bool,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            record_format: RecordFormat::default(),
            charset: Charset::default(),
            with_header: false,
            quote: QuoteMode::default(),
            with_last_sep: false,
        }
    }
}
