//! Cache service trait and error types.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Volatile key-value cache shared by every service instance.
///
/// Implementations report failures honestly; the callers decide the degraded
/// behaviour. The resolver treats any error as a miss and the rate governor fails
/// open, so an unavailable cache never breaks redirects.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, shared across instances
/// - [`crate::infrastructure::cache::ReconnectingRedisCache`] - Unavailable until Redis comes back
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process, single instance only
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the value stored under `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` for `ttl_seconds`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Atomically increments the counter under `key` and returns the new count.
    ///
    /// The increment that creates the key also arms its expiry of `ttl_seconds`;
    /// later increments leave the expiry untouched, which yields fixed windows.
    async fn incr_with_expiry(&self, key: &str, ttl_seconds: u64) -> CacheResult<u64>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

/// Bounds a cache call, turning an elapsed deadline into [`CacheError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, op: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    tokio::time::timeout(limit, op)
        .await
        .unwrap_or(Err(CacheError::Timeout(limit)))
}
