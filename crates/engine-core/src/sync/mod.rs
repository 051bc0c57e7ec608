pub mod latch;
pub mod slot;
