//! Edge cache for resolved redirects.
//!
//! Provides an [`EdgeCache`] trait with three implementations:
//! - [`MemoryCache`] - process-local cache (default)
//! - [`RedisCache`] - Redis-backed cache shared between instances
//! - [`NullCache`] - no-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CachedRedirect, EdgeCache};
