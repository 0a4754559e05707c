//! Key-value storage for links and telemetry.
//!
//! Provides a [`KvStore`] trait with two implementations:
//! - [`MemoryKv`] - process-local map for development and tests
//! - [`RedisKv`] - Redis-backed production store

mod memory_kv;
mod redis_kv;
mod service;

use std::sync::Arc;

pub use memory_kv::MemoryKv;
pub use redis_kv::RedisKv;
pub use service::{KvStore, StoreError, StoreResult};

#[cfg(test)]
pub use service::MockKvStore;

/// Opens the store named by a binding URL.
///
/// `memory://` selects [`MemoryKv`]; `redis://` and `rediss://` select
/// [`RedisKv`] with keys prefixed by `namespace`.
///
/// # Errors
///
/// Returns [`StoreError::Connection`] for unsupported schemes or when Redis
/// cannot be reached.
pub async fn connect(binding_url: &str, namespace: &str) -> StoreResult<Arc<dyn KvStore>> {
    if binding_url.starts_with("memory://") {
        tracing::warn!(namespace, "Using in-process store; data is lost on restart");
        return Ok(Arc::new(MemoryKv::new()));
    }

    if binding_url.starts_with("redis://") || binding_url.starts_with("rediss://") {
        return Ok(Arc::new(RedisKv::connect(binding_url, namespace).await?));
    }

    Err(StoreError::Connection(format!(
        "unsupported store URL scheme for namespace {namespace}"
    )))
}
