pub mod rule;
pub mod shard;
