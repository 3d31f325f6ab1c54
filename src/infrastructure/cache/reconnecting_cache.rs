//! Redis cache that keeps retrying a connection that failed at startup.

use super::redis_cache::RedisCache;
use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Stands in for [`RedisCache`] until Redis becomes reachable.
///
/// Until connected every operation fails with [`CacheError::ConnectionError`], so
/// resolution falls through to the store, rate limiting takes its fail-open path and
/// `/health` reports the cache as down. Once [`connect_in_background`] succeeds all
/// calls delegate to the live [`RedisCache`].
///
/// [`connect_in_background`]: ReconnectingRedisCache::connect_in_background
pub struct ReconnectingRedisCache {
    redis_url: String,
    key_prefix: String,
    op_timeout: Duration,
    inner: OnceCell<RedisCache>,
}

impl ReconnectingRedisCache {
    pub fn new(
        redis_url: impl Into<String>,
        key_prefix: impl Into<String>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            redis_url: redis_url.into(),
            key_prefix: key_prefix.into(),
            op_timeout,
            inner: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.initialized()
    }

    /// Retries [`RedisCache::connect`] with jittered backoff until it succeeds.
    ///
    /// Meant to run in its own task; returns once the connection is installed.
    pub async fn connect_in_background(&self) {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(RECONNECT_MAX_DELAY)
            .map(jitter);

        let result = Retry::spawn(strategy, || async {
            RedisCache::connect(&self.redis_url, self.key_prefix.clone(), self.op_timeout)
                .await
                .inspect_err(|e| warn!("Redis still unreachable: {}", e))
        })
        .await;

        match result {
            Ok(cache) => {
                if self.inner.set(cache).is_ok() {
                    info!("Redis connection restored, cache enabled");
                }
            }
            Err(e) => warn!("Giving up on Redis reconnection: {}", e),
        }
    }

    fn connected(&self) -> CacheResult<&RedisCache> {
        self.inner
            .get()
            .ok_or_else(|| CacheError::ConnectionError("Redis not connected".to_string()))
    }
}

#[async_trait]
impl CacheService for ReconnectingRedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.connected()?.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.connected()?.set_with_ttl(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.connected()?.delete(key).await
    }

    async fn incr_with_expiry(&self, key: &str, ttl_seconds: u64) -> CacheResult<u64> {
        self.connected()?.incr_with_expiry(key, ttl_seconds).await
    }

    async fn health_check(&self) -> bool {
        match self.inner.get() {
            Some(cache) => cache.health_check().await,
            None => false,
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
