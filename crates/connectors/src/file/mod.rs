pub mod csv;
pub mod delimited;
pub mod error;
pub mod reader;
