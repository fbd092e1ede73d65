use async_trait::async_trait;
use configs::StoreConfig;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};
use url::Url;

use super::KvStore;
use crate::errors::ServiceError;

/// Redis-backed store. One multiplexed connection is opened at startup and
/// cloned per call; there is no pool and no reconnect logic.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    pub async fn connect(cfg: &StoreConfig) -> Result<Self, ServiceError> {
        let url = connection_url(cfg)?;
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!(event = "store_connected", host = %cfg.host, port = cfg.port, tls = cfg.tls, "connected to redis");
        Ok(Self::new(conn))
    }
}

/// `redis://` or `rediss://` URL with the password percent-encoded into the userinfo.
pub fn connection_url(cfg: &StoreConfig) -> Result<Url, ServiceError> {
    if cfg.host.trim().is_empty() {
        return Err(ServiceError::empty("store host"));
    }
    let scheme = if cfg.tls { "rediss" } else { "redis" };
    let mut url = Url::parse(&format!("{scheme}://{}:{}", cfg.host.trim(), cfg.port))
        .map_err(|e| ServiceError::Validation(format!("invalid store address: {e}")))?;
    if !cfg.password.is_empty() {
        url.set_password(Some(&cfg.password))
            .map_err(|_| ServiceError::Validation("store address cannot carry a password".into()))?;
    }
    Ok(url)
}

#[async_trait]
impl KvStore for RedisStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        debug!(pattern, count = keys.len(), "redis keys");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<String, ServiceError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value.unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str) -> Result<String, ServiceError> {
        let mut conn = self.conn.clone();
        let reply: String = conn.set(key, value).await?;
        Ok(reply)
    }

    async fn delete(&self, key: &str) -> Result<i64, ServiceError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed)
    }

    async fn flush_all(&self) -> Result<String, ServiceError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        Ok(reply)
    }
}
