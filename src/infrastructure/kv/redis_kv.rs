//! Redis-backed key-value store.

use super::service::{KvStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::info;

/// Redis implementation of [`KvStore`].
///
/// Each binding gets its own key prefix so the link and telemetry namespaces
/// can share one Redis database. Unlike the redirect cache, errors are
/// propagated: callers retry and surface exhaustion.
pub struct RedisKv {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisKv {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(redis_url: &str, namespace: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {e}")))?;

        info!(namespace, "Connected key-value namespace to Redis");

        Ok(Self {
            client: manager,
            key_prefix: format!("{namespace}:"),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.client.clone();
        conn.get::<_, Option<String>>(self.build_key(key))
            .await
            .map_err(|e| StoreError::Operation(format!("GET {key}: {e}")))
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.set::<_, _, ()>(self.build_key(key), value)
            .await
            .map_err(|e| StoreError::Operation(format!("SET {key}: {e}")))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.del::<_, i32>(self.build_key(key))
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Operation(format!("DEL {key}: {e}")))
    }
}
