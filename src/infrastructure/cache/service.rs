//! Edge cache trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A redirect response as held by the edge cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRedirect {
    /// Target of the `Location` header.
    pub location: String,
}

/// Response cache keyed by canonical short path (`/s/<code>`).
///
/// The cache only ever holds API-style redirects. Implementations are
/// fail-open: a broken backend behaves like an empty cache and must never
/// turn a successful redirect into an error.
///
/// Writes after a miss happen in a background task, so one can land after
/// an update has evicted the same path. The stale target is then served
/// until its TTL runs out.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - process-local, per-entry expiry
/// - [`crate::infrastructure::cache::RedisCache`] - Redis with `SET EX`
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[async_trait]
pub trait EdgeCache: Send + Sync {
    /// Looks up a cached redirect for `path`.
    ///
    /// Returns `Ok(None)` on miss or expiry.
    async fn get(&self, path: &str) -> CacheResult<Option<CachedRedirect>>;

    /// Stores a redirect for `path`, expiring after `ttl`.
    async fn put(&self, path: &str, entry: &CachedRedirect, ttl: Duration) -> CacheResult<()>;

    /// Evicts the entry for `path`. Returns whether something was removed.
    async fn delete(&self, path: &str) -> CacheResult<bool>;
}
