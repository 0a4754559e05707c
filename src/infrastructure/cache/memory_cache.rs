//! Process-local edge cache.

use super::service::{CacheResult, CachedRedirect, EdgeCache};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Entry count above which expired slots are swept on write.
const PRUNE_THRESHOLD: usize = 10_000;

struct Slot {
    entry: CachedRedirect,
    expires_at: Instant,
}

/// In-memory [`EdgeCache`] with per-entry expiry.
///
/// Expired entries are dropped lazily on lookup, and swept on write once the
/// table grows past a threshold. The cache is local to one running instance;
/// other instances keep their own copies until TTL.
#[derive(Default)]
pub struct MemoryCache {
    slots: DashMap<String, Slot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl MemoryCache {
    fn prune(&self) {
        let now = Instant::now();
        self.slots.retain(|_, slot| slot.expires_at > now);
        tracing::debug!(remaining = self.slots.len(), "Pruned edge cache");
    }
}

#[async_trait]
impl EdgeCache for MemoryCache {
    async fn get(&self, path: &str) -> CacheResult<Option<CachedRedirect>> {
        let now = Instant::now();
        if let Some(slot) = self.slots.get(path) {
            if slot.expires_at > now {
                return Ok(Some(slot.entry.clone()));
            }
        }
        self.slots.remove_if(path, |_, slot| slot.expires_at <= now);
        Ok(None)
    }

    async fn put(&self, path: &str, entry: &CachedRedirect, ttl: Duration) -> CacheResult<()> {
        self.slots.insert(
            path.to_string(),
            Slot {
                entry: entry.clone(),
                expires_at: Instant::now() + ttl,
            },
        );

        if self.slots.len() > PRUNE_THRESHOLD {
            self.prune();
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> CacheResult<bool> {
        Ok(self.slots.remove(path).is_some())
    }
}
