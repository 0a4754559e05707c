//! In-process key-value store.

use super::service::{KvStore, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;

/// A [`KvStore`] backed by a concurrent map.
///
/// State lives as long as the process. Used for local development
/// (`memory://` bindings) and tests.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("code:a").await.unwrap(), None);

        kv.put("code:a", "https://app.example/#x").await.unwrap();
        assert_eq!(
            kv.get("code:a").await.unwrap().as_deref(),
            Some("https://app.example/#x")
        );

        kv.put("code:a", "https://app.example/#y").await.unwrap();
        assert_eq!(kv.len(), 1);

        kv.delete("code:a").await.unwrap();
        kv.delete("code:a").await.unwrap();
        assert!(kv.is_empty());
    }
}
