pub mod core;
pub mod execution;
pub mod metadata;
pub mod records;
pub mod topology;
