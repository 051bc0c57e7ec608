use serde::{Deserialize, Serialize};
use std::fmt;

/// Controls whether an exported field is enclosed in double quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteMode {
    /// Never quote.
    None,
    /// Always quote.
    Force,
    /// Quote string columns containing the separator, CR, LF or a double quote.
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressMode {
    #[default]
    None,
    Gzip,
}

/// Encryption is performed by an external codec; only the selection is modelled here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionMode {
    #[default]
    None,
    Aes,
    Sm4,
}

/// Special output container formats handled by external writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    #[default]
    None,
    Xlsx,
    Parquet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DdlMode {
    /// Import data only; target tables must already exist.
    #[default]
    NoDdl,
    /// Replay DDL, then import data.
    WithDdl,
    /// Replay DDL and stop.
    DdlOnly,
}

/// Layout of records in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordFormat {
    /// One record per line, fields split on the separator, no quoting.
    #[default]
    Delimited,
    /// RFC 4180 quoting with a single-character separator.
    Csv,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

impl Charset {
    /// Decodes one raw record. Invalid UTF-8 is reported as `None`.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteMode::None => "NONE",
            QuoteMode::Force => "FORCE",
            QuoteMode::Auto => "AUTO",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DdlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DdlMode::NoDdl => "NO_DDL",
            DdlMode::WithDdl => "WITH_DDL",
            DdlMode::DdlOnly => "DDL_ONLY",
        };
        f.write_str(name)
    }
}
