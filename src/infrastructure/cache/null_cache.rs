//! No-op cache used when edge caching is disabled.

use super::service::{CacheResult, CachedRedirect, EdgeCache};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that never stores anything.
///
/// Selected with `EDGE_CACHE=off`. Every redirect is then built from the
/// link store.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (edge caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeCache for NullCache {
    async fn get(&self, _path: &str) -> CacheResult<Option<CachedRedirect>> {
        Ok(None)
    }

    async fn put(&self, _path: &str, _entry: &CachedRedirect, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _path: &str) -> CacheResult<bool> {
        Ok(false)
    }
}
