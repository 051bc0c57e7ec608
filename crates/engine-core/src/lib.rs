pub mod buffer;
pub mod context;
pub mod error;
pub mod metrics;
pub mod sync;
pub mod topology;
