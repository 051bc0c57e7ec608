use crate::file::{
    error::FileError,
    reader::{ReaderOptions, RecordReader},
};
use csv::{ByteRecord, ReaderBuilder};
use model::{core::constants::MAGIC_FIELD_SEPARATOR, execution::modes::Charset};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Quoted CSV reader. Fields are unquoted here and re-joined with
/// [`MAGIC_FIELD_SEPARATOR`] so downstream parsing never sees CSV quoting.
pub struct CsvRecordReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    record: ByteRecord,
    charset: Charset,
    max_multiline: usize,
    lines: u64,
}

impl CsvRecordReader {
    pub fn open(path: &Path, options: &ReaderOptions) -> Result<Self, FileError> {
        let delimiter = match options.separator.as_bytes() {
            [byte] => *byte,
            _ => return Err(FileError::InvalidSeparator(options.separator.clone())),
        };

        let file = File::open(path).map_err(|e| FileError::from_open(path.to_path_buf(), e))?;
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .double_quote(true)
            .from_reader(file);

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            record: ByteRecord::new(),
            charset: options.charset,
            max_multiline: options.max_multiline.max(1),
            lines: 0,
        })
    }

    fn decode_field(&self, field: &[u8], line: u64) -> Result<String, FileError> {
        self.charset.decode(field).ok_or_else(|| FileError::Encoding {
            path: self.path.clone(),
            line,
        })
    }
}

impl RecordReader for CsvRecordReader {
    fn next_record(&mut self) -> Result<Option<String>, FileError> {
        let start_line = self.reader.position().line();
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        let end_line = self.reader.position().line();
        let span = end_line.saturating_sub(start_line).max(1);
        self.lines += span;

        if span > self.max_multiline as u64 {
            return Err(FileError::LineTooLong {
                path: self.path.clone(),
                line: start_line,
                span,
                max: self.max_multiline,
            });
        }

        let fields = self
            .record
            .iter()
            .map(|field| self.decode_field(field, start_line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(fields.join(MAGIC_FIELD_SEPARATOR)))
    }

    fn lines_read(&self) -> u64 {
        self.lines
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn options(separator: &str, max_multiline: usize) -> ReaderOptions {
        ReaderOptions {
            separator: separator.to_string(),
            charset: Charset::Utf8,
            max_multiline,
        }
    }

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn split(record: &str) -> Vec<&str> {
        record.split(MAGIC_FIELD_SEPARATOR).collect()
    }

    #[test]
    fn unquotes_embedded_separators_and_newlines() {
        let file = write_file("1,\"a,b\",\"say \"\"hi\"\"\"\n2,\"line1\nline2\",x\n");
        let mut reader = CsvRecordReader::open(file.path(), &options(",", 4)).unwrap();

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(split(&first), vec!["1", "a,b", "say \"hi\""]);

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(split(&second), vec!["2", "line1\nline2", "x"]);

        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn rejects_multi_character_separators() {
        let file = write_file("a||b\n");
        let err = CsvRecordReader::open(file.path(), &options("||", 4)).err().unwrap();
        assert!(matches!(err, FileError::InvalidSeparator(s) if s == "||"));
    }

    #[test]
    fn oversized_logical_line_fails() {
        let file = write_file("1,\"a\nb\nc\nd\"\n");
        let mut reader = CsvRecordReader::open(file.path(), &options(",", 2)).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, FileError::LineTooLong { max: 2, .. }));
    }
}
