pub mod consumer;
pub mod error;
pub mod export;
pub mod parse;
pub mod producer;
pub mod statement;

#[cfg(test)]
pub(crate) mod testing;
