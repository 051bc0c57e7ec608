pub mod masker;
pub mod query;
pub mod worker;
pub mod writer;
