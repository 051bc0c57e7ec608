pub mod adapter;
pub mod cursor;
pub mod source;
