use crate::file::{csv::CsvRecordReader, delimited::DelimitedReader, error::FileError};
use model::execution::modes::{Charset, RecordFormat};
use std::path::Path;

/// Pulls logical records out of one source file.
///
/// Readers are blocking and are driven from a blocking task.
pub trait RecordReader: Send {
    /// The next logical record, or `None` at end of file.
    fn next_record(&mut self) -> Result<Option<String>, FileError>;

    /// Physical lines consumed so far.
    fn lines_read(&self) -> u64;

    fn path(&self) -> &Path;
}

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub separator: String,
    pub charset: Charset,
    pub max_multiline: usize,
}

pub fn open_reader(
    format: RecordFormat,
    path: &Path,
    options: &ReaderOptions,
) -> Result<Box<dyn RecordReader>, FileError> {
    match format {
        RecordFormat::Delimited => Ok(Box::new(DelimitedReader::open(path, options.charset)?)),
        RecordFormat::Csv => Ok(Box::new(CsvRecordReader::open(path, options)?)),
    }
}
