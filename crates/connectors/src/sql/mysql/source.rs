use crate::sql::{
    connection::{ConnectionSource, DbConnection},
    error::DbError,
    mysql::adapter::MySqlAdapter,
};
use async_trait::async_trait;
use model::topology::shard::ShardTarget;
use mysql_async::Pool;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};
use tracing::{info, warn};

/// Pool-per-URL connection source. The default URL serves unsharded work,
/// each distinct shard URL gets its own pool on first use.
pub struct MySqlConnectionSource {
    url: String,
    pools: Mutex<HashMap<String, Pool>>,
}

impl MySqlConnectionSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pools: Mutex::new(HashMap::new()),
        }
    }

    fn pool(&self, url: &str) -> Result<Pool, DbError> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(url) {
            return Ok(pool.clone());
        }

        let pool = Pool::from_url(url)?;
        info!(target_host = %redact_url(url), "Created connection pool");
        pools.insert(url.to_string(), pool.clone());
        Ok(pool)
    }

    async fn open(&self, url: &str) -> Result<Box<dyn DbConnection>, DbError> {
        let pool = self.pool(url)?;
        let conn = pool.get_conn().await.map_err(|e| DbError::Connect {
            target: redact_url(url),
            message: e.to_string(),
        })?;
        Ok(Box::new(MySqlAdapter::new(conn)))
    }
}

#[async_trait]
impl ConnectionSource for MySqlConnectionSource {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DbError> {
        self.open(&self.url).await
    }

    async fn connect_shard(&self, shard: &ShardTarget) -> Result<Box<dyn DbConnection>, DbError> {
        self.open(&shard.url).await
    }

    async fn shutdown(&self) -> Result<(), DbError> {
        let pools: Vec<Pool> = {
            let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
            pools.drain().map(|(_, pool)| pool).collect()
        };

        for pool in pools {
            if let Err(e) = pool.disconnect().await {
                warn!("Failed to disconnect pool: {}", e);
            }
        }
        Ok(())
    }
}

/// Strips credentials so URLs can be logged.
pub fn redact_url(url: &str) -> String {
    match (url.split_once("://"), url.rfind('@')) {
        (Some((scheme, _)), Some(at)) => format!("{scheme}://***@{}", &url[at + 1..]),
        _ => url.to_string(),
    }
}
