use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{glob::glob_match, KvStore};
use crate::errors::ServiceError;

/// In-process store with Redis reply semantics. Keys enumerate in lexical order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { inner: RwLock::new(map) }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.keys().filter(|k| glob_match(pattern, k)).cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<String, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str) -> Result<String, ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), value.to_string());
        Ok("OK".to_string())
    }

    async fn delete(&self, key: &str) -> Result<i64, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(i64::from(map.remove(key).is_some()))
    }

    async fn flush_all(&self) -> Result<String, ServiceError> {
        self.inner.write().await.clear();
        Ok("OK".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scenario_keys_get_delete() -> Result<(), anyhow::Error> {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);

        assert_eq!(store.keys("*").await?, vec!["a", "b"]);
        assert_eq!(store.get("a").await?, "1");
        assert_eq!(store.delete("a").await?, 1);
        assert_eq!(store.get("a").await?, "");
        assert_eq!(store.keys("*").await?, vec!["b"]);
        Ok(())
    }

    #[tokio::test]
    async fn absent_key_reads_empty_and_deletes_zero() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await?, "");
        assert_eq!(store.delete("missing").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn set_overwrites_value_verbatim() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let raw = "  {\"n\": 1}  ";
        assert_eq!(store.set("k", "old").await?, "OK");
        store.set("k", raw).await?;
        assert_eq!(store.get("k").await?, raw);
        Ok(())
    }

    #[tokio::test]
    async fn flush_all_empties_store() -> Result<(), anyhow::Error> {
        let store = MemoryStore::with_entries([("user:1", "x"), ("user:2", "y"), ("session", "z")]);
        assert_eq!(store.keys("user:*").await?, vec!["user:1", "user:2"]);
        assert_eq!(store.flush_all().await?, "OK");
        assert!(store.is_empty().await);
        assert!(store.keys("*").await?.is_empty());
        Ok(())
    }
}
