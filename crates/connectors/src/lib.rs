pub mod adapter;
pub mod error;
pub mod file;
pub mod sink;
pub mod sql;
