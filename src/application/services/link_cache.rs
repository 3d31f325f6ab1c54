//! Best-effort cache projection of short link records.
//!
//! Every helper here swallows cache failures after logging them: the cache is a
//! non-authoritative copy and the store remains the source of truth.

use tracing::{debug, warn};

use crate::domain::entities::{CachedLink, ShortLink};
use crate::infrastructure::cache::CacheService;

/// Default lifetime of a cached record, independent of the record's own expiry.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

pub fn cache_key(code: &str) -> String {
    format!("url:{code}")
}

/// Looks up the projection for `code`. Errors and undecodable entries read as a miss.
pub async fn lookup(cache: &dyn CacheService, code: &str) -> Option<CachedLink> {
    let key = cache_key(code);

    match cache.get(&key).await {
        Ok(Some(raw)) => match serde_json::from_str::<CachedLink>(&raw) {
            Ok(cached) => {
                debug!("Cache HIT for {}", code);
                metrics::counter!("cache_lookups_total", "result" => "hit").increment(1);
                Some(cached)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry for {}: {}", code, e);
                invalidate(cache, code).await;
                None
            }
        },
        Ok(None) => {
            debug!("Cache MISS for {}", code);
            metrics::counter!("cache_lookups_total", "result" => "miss").increment(1);
            None
        }
        Err(e) => {
            warn!("Cache lookup failed for {}, falling back to store: {}", code, e);
            metrics::counter!("cache_lookups_total", "result" => "error").increment(1);
            None
        }
    }
}

/// Stores the projection of `link` for `ttl_seconds`.
pub async fn populate(cache: &dyn CacheService, link: &ShortLink, ttl_seconds: u64) {
    let value = match serde_json::to_string(&link.to_cached()) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to encode cache entry for {}: {}", link.code, e);
            return;
        }
    };

    if let Err(e) = cache
        .set_with_ttl(&cache_key(&link.code), &value, ttl_seconds)
        .await
    {
        warn!("Failed to cache {}: {}", link.code, e);
    }
}

/// Drops any cached projection for `code`.
pub async fn invalidate(cache: &dyn CacheService, code: &str) {
    if let Err(e) = cache.delete(&cache_key(code)).await {
        warn!("Failed to invalidate cache for {}: {}", code, e);
    }
}
