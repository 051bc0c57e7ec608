pub mod ddl;
pub mod export;
pub mod files;
pub mod import;
pub mod workers;
