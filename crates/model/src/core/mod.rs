pub mod constants;
pub mod data_type;
