//! Caching layer for redirects and rate counters.
//!
//! Provides a [`CacheService`] trait with these implementations:
//! - [`RedisCache`] - Production Redis-backed cache shared by all instances
//! - [`ReconnectingRedisCache`] - Unavailable cache that retries Redis in the background
//! - [`MemoryCache`] - In-process cache for single-instance runs
//! - [`NullCache`] - No-op implementation for tools that run without a cache

mod memory_cache;
mod null_cache;
mod reconnecting_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use reconnecting_cache::ReconnectingRedisCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, with_timeout};

#[cfg(test)]
pub use service::MockCacheService;
