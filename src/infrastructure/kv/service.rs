//! Key-value store trait and error types.

use async_trait::async_trait;

/// Errors raised by a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation error: {0}")]
    Operation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A flat string-to-string namespace.
///
/// The store gives no uniqueness or multi-key guarantees. Callers that need
/// them (unique short codes, the reverse index) enforce them by probing.
///
/// # Implementations
///
/// - [`crate::infrastructure::kv::MemoryKv`] - process-local map
/// - [`crate::infrastructure::kv::RedisKv`] - Redis with a per-namespace key prefix
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
