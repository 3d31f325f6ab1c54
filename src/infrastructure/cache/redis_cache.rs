//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, with_timeout};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Increments a counter and arms its expiry only when the increment created it.
///
/// Runs as one script so concurrent instances never observe a counter without a TTL.
const INCR_WITH_EXPIRY: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
";

/// Redis cache shared by all service instances.
///
/// Uses `ConnectionManager` for automatic reconnection. Every command is bounded by
/// `op_timeout`; errors and timeouts are returned to the caller.
pub struct RedisCache {
    client: ConnectionManager,
    incr_script: Script,
    key_prefix: String,
    op_timeout: Duration,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `key_prefix` - Namespace prepended to every key
    /// - `op_timeout` - Deadline applied to each command
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        key_prefix: impl Into<String>,
        op_timeout: Duration,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            incr_script: Script::new(INCR_WITH_EXPIRY),
            key_prefix: key_prefix.into(),
            op_timeout,
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

fn op_error(e: redis::RedisError) -> CacheError {
    if e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error() {
        CacheError::ConnectionError(e.to_string())
    } else {
        CacheError::OperationError(e.to_string())
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let value = with_timeout(self.op_timeout, async {
            conn.get::<_, Option<String>>(&full_key)
                .await
                .map_err(op_error)
        })
        .await?;

        debug!(
            "Redis GET {}: {}",
            key,
            if value.is_some() { "hit" } else { "miss" }
        );
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        with_timeout(self.op_timeout, async {
            conn.set_ex::<_, _, ()>(&full_key, value, ttl_seconds)
                .await
                .map_err(op_error)
        })
        .await?;

        debug!("Redis SET {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let deleted = with_timeout(self.op_timeout, async {
            conn.del::<_, i64>(&full_key).await.map_err(op_error)
        })
        .await?;

        if deleted > 0 {
            debug!("Redis DEL {}", key);
        }
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl_seconds: u64) -> CacheResult<u64> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        with_timeout(self.op_timeout, async {
            self.incr_script
                .key(&full_key)
                .arg(ttl_seconds)
                .invoke_async::<u64>(&mut conn)
                .await
                .map_err(op_error)
        })
        .await
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        with_timeout(self.op_timeout, async {
            conn.ping::<()>().await.map_err(op_error)
        })
        .await
        .is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
