use crate::file::{error::FileError, reader::RecordReader};
use model::{
    core::constants::{CR_BYTE, LF_BYTE},
    execution::modes::Charset,
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

/// One record per physical line. Fields are split later by the consumer.
pub struct DelimitedReader {
    path: PathBuf,
    reader: BufReader<File>,
    charset: Charset,
    buf: Vec<u8>,
    line_no: u64,
}

impl DelimitedReader {
    pub fn open(path: &Path, charset: Charset) -> Result<Self, FileError> {
        let file = File::open(path).map_err(|e| FileError::from_open(path.to_path_buf(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            charset,
            buf: Vec::with_capacity(1024),
            line_no: 0,
        })
    }
}

impl RecordReader for DelimitedReader {
    fn next_record(&mut self) -> Result<Option<String>, FileError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(LF_BYTE, &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            if self.buf.last() == Some(&LF_BYTE) {
                self.buf.pop();
                if self.buf.last() == Some(&CR_BYTE) {
                    self.buf.pop();
                }
            }
            // blank lines carry no record
            if self.buf.is_empty() {
                continue;
            }

            return match self.charset.decode(&self.buf) {
                Some(line) => Ok(Some(line)),
                None => Err(FileError::Encoding {
                    path: self.path.clone(),
                    line: self.line_no,
                }),
            };
        }
    }

    fn lines_read(&self) -> u64 {
        self.line_no
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

    fn write_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn reads_lines_with_mixed_terminators() {
        let file = write_file(b"1,a\r\n2,b\n\n3,c");
        let mut reader = DelimitedReader::open(file.path(), Charset::Utf8).unwrap();

        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record);
        }

        assert_eq!(records, vec!["1,a", "2,b", "3,c"]);
        assert_eq!(reader.lines_read(), 4);
    }

    #[test]
    fn invalid_utf8_reports_the_line() {
        let file = write_file(b"ok\n\xff\xfe\n");
        let mut reader = DelimitedReader::open(file.path(), Charset::Utf8).unwrap();

        assert_eq!(reader.next_record().unwrap().as_deref(), Some("ok"));
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, FileError::Encoding { line: 2, .. }));
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let file = write_file(b"caf\xe9\n");
        let mut reader = DelimitedReader::open(file.path(), Charset::Latin1).unwrap();
        assert_eq!(reader.next_record().unwrap().as_deref(), Some("café"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = DelimitedReader::open(Path::new("/nonexistent/input.txt"), Charset::Utf8)
            .err()
            .unwrap();
        assert!(matches!(err, FileError::NotFound(_)));
    }
}
