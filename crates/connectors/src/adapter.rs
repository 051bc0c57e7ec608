use crate::{
    error::AdapterError,
    sql::{connection::ConnectionSource, mysql::source::MySqlConnectionSource},
};
use std::sync::Arc;

/// Builds the connection source matching the scheme of `url`.
pub fn connection_source(url: &str) -> Result<Arc<dyn ConnectionSource>, AdapterError> {
    if url.trim().is_empty() {
        return Err(AdapterError::MissingProperty("url".to_string()));
    }

    match url.split_once("://").map(|(scheme, _)| scheme) {
        Some("mysql") | Some("polardbx") => {
            let url = url.replacen("polardbx://", "mysql://", 1);
            Ok(Arc::new(MySqlConnectionSource::new(url)))
        }
        Some(other) => Err(AdapterError::UnsupportedDriver(other.to_string())),
        None => Err(AdapterError::UnsupportedDriver(url.to_string())),
    }
}
