//! Short link record and its cache projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted length of a target URL.
pub const MAX_TARGET_URL_LEN: usize = 2048;

/// The authoritative mapping from a short code to its target URL.
///
/// `code` is unique across all records. `click_count` only grows while the record
/// exists. A record past `expires_at` is logically retired; expiry is checked on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShortLink {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub is_custom: bool,
    pub created_by: Option<String>,
}

impl ShortLink {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the link is expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Projection stored in the fast cache.
    pub fn to_cached(&self) -> CachedLink {
        CachedLink {
            target_url: self.target_url.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Input data for inserting a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub code: String,
    pub target_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_custom: bool,
    pub created_by: Option<String>,
}

/// Non-authoritative cache entry for a short code.
///
/// Carries the record expiry so a cache hit can still refuse an expired link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLink {
    pub target_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedLink {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}
