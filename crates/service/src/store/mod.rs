//! Key-value store abstraction.
//!
//! Every method maps 1:1 onto one store primitive and returns its reply
//! unchanged. Implementations hold no state of their own beyond the
//! connection (or, for `MemoryStore`, the map itself).

pub mod glob;
pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{StoreBackend, StoreConfig};
use tracing::warn;

use crate::errors::ServiceError;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Keys matching a glob pattern (`KEYS`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError>;
    /// Value of a key, or an empty string when absent (`GET`).
    async fn get(&self, key: &str) -> Result<String, ServiceError>;
    /// Set a key, overwriting any existing value (`SET`).
    async fn set(&self, key: &str, value: &str) -> Result<String, ServiceError>;
    /// Number of keys removed, 0 or 1 (`DEL`).
    async fn delete(&self, key: &str) -> Result<i64, ServiceError>;
    /// Remove every key from every database (`FLUSHALL`).
    async fn flush_all(&self) -> Result<String, ServiceError>;
}

/// Open the single long-lived store connection selected by configuration.
pub async fn connect(cfg: &StoreConfig) -> Result<Arc<dyn KvStore>, ServiceError> {
    match cfg.backend {
        StoreBackend::Redis => Ok(Arc::new(RedisStore::connect(cfg).await?)),
        StoreBackend::Memory => {
            warn!(event = "memory_store", "using in-process store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
