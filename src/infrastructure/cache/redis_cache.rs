//! Redis-backed edge cache.

use super::service::{CacheError, CacheResult, CachedRedirect, EdgeCache};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis implementation of [`EdgeCache`].
///
/// Entries are JSON-encoded [`CachedRedirect`] values under `edge:<path>`.
/// All operations are fail-open: errors are logged and reported as a miss or
/// a no-op.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {e}")))?;

        info!("Connected edge cache to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "edge:".to_string(),
        })
    }

    fn build_key(&self, path: &str) -> String {
        format!("{}{}", self.key_prefix, path)
    }
}

#[async_trait]
impl EdgeCache for RedisCache {
    async fn get(&self, path: &str) -> CacheResult<Option<CachedRedirect>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(self.build_key(path)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(entry) => {
                    debug!(path, "Edge cache HIT");
                    Ok(Some(entry))
                }
                Err(e) => {
                    warn!(path, error = %e, "Discarding undecodable edge cache entry");
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!(path, "Edge cache MISS");
                Ok(None)
            }
            Err(e) => {
                warn!(path, error = %e, "Redis GET error, treating as miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, path: &str, entry: &CachedRedirect, ttl: Duration) -> CacheResult<()> {
        let raw = serde_json::to_string(entry)
            .map_err(|e| CacheError::Operation(format!("encode cache entry: {e}")))?;
        let mut conn = self.client.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(self.build_key(path), raw, ttl.as_secs().max(1))
            .await
        {
            warn!(path, error = %e, "Redis SET error");
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> CacheResult<bool> {
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(self.build_key(path)).await {
            Ok(deleted) => Ok(deleted > 0),
            Err(e) => {
                warn!(path, error = %e, "Redis DEL error");
                Ok(false)
            }
        }
    }
}
