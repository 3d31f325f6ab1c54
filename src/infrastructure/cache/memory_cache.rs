//! In-process cache for single-instance deployments.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Counter(u64),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    expires_at: Instant,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cache backed by a concurrent map inside this process.
///
/// Counters and entries are not shared with other instances, so rate limits are
/// per-process. Expired slots are dropped lazily on access and by [`MemoryCache::purge_expired`].
/// Time comes from `tokio::time`, so paused-clock tests can step across windows.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: DashMap<String, Slot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        debug!("Using MemoryCache (in-process)");
        Self::default()
    }

    /// Removes every expired slot and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.is_live(now));
        before.saturating_sub(self.slots.len())
    }

    /// Number of slots currently held, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        let value = match self.slots.get(key) {
            Some(slot) if slot.is_live(now) => match &slot.value {
                Value::Text(text) => Some(text.clone()),
                Value::Counter(count) => Some(count.to_string()),
            },
            _ => None,
        };

        if value.is_none() {
            self.slots.remove_if(key, |_, slot| !slot.is_live(now));
        }

        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.slots.insert(
            key.to_string(),
            Slot {
                value: Value::Text(value.to_string()),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.slots.remove(key);
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl_seconds: u64) -> CacheResult<u64> {
        let now = Instant::now();
        let fresh = || Slot {
            value: Value::Counter(1),
            expires_at: now + Duration::from_secs(ttl_seconds),
        };

        // The entry guard holds the shard lock, so read-modify-write is atomic.
        let count = match self.slots.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                if slot.is_live(now)
                    && let Value::Counter(count) = &mut slot.value
                {
                    *count += 1;
                    *count
                } else {
                    *slot = fresh();
                    1
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh());
                1
            }
        };

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
