/// Field separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Number of records grouped into one row batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Number of batch slots in the bounded buffer shared by producers and consumers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Rows accumulated into one multi-row INSERT before it is executed.
pub const DEFAULT_INSERT_BATCH_ROWS: usize = 500;

/// Upper bound on the length of one generated INSERT statement.
pub const DEFAULT_MAX_STATEMENT_BYTES: usize = 1 << 20;

/// Maximum number of physical lines a quoted CSV record may span.
pub const DEFAULT_MAX_CSV_MULTILINE: usize = 16;

/// Textual representation of SQL NULL in flat files.
pub const NULL_MARKER: &str = "\\N";

/// Joins already-split CSV fields inside a row batch. The unit separator
/// control character never appears in well-formed text data.
pub const MAGIC_FIELD_SEPARATOR: &str = "\u{1f}";

/// Sequences that may not appear inside a configured separator.
pub const ILLEGAL_SEPARATORS: [&str; 3] = ["\r", "\n", "\""];

pub const CR_BYTE: u8 = b'\r';
pub const LF_BYTE: u8 = b'\n';
pub const DOUBLE_QUOTE_BYTE: u8 = b'"';
