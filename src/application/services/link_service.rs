//! Short link creation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::code_allocator::CodeAllocator;
use super::link_cache;
use crate::domain::entities::{MAX_TARGET_URL_LEN, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::validate_custom_code;

/// Allocation rounds for a generated code whose insert lost a race.
const INSERT_RACE_ROUNDS: usize = 3;

/// Longest accepted link lifetime.
pub const MAX_TTL_DAYS: u32 = 3650;

/// Service for creating short links.
///
/// Allocates a code, writes the record through the store's atomic insert, then
/// warms the cache so the first redirect is a hit.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    allocator: CodeAllocator,
    cache_ttl_seconds: u64,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        allocator: CodeAllocator,
        cache_ttl_seconds: u64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            allocator,
            cache_ttl_seconds,
            base_url: base_url.into(),
        }
    }

    /// Creates a short link for `target_url`.
    ///
    /// # Arguments
    ///
    /// - `target_url` - The URL to redirect to (at most 2048 characters)
    /// - `custom_code` - Optional user-chosen code
    /// - `ttl_days` - Optional lifetime; `None` never expires
    /// - `created_by` - Optional client identity recorded for reporting
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an over-long URL, bad custom code or TTL
    /// - [`AppError::AlreadyTaken`] if the custom code exists, including a concurrent
    ///   insert of the same code
    /// - [`AppError::AllocationExhausted`] if no free generated code was found
    /// - [`AppError::Internal`] on store errors
    pub async fn create_short_link(
        &self,
        target_url: String,
        custom_code: Option<String>,
        ttl_days: Option<u32>,
        created_by: Option<String>,
    ) -> Result<ShortLink, AppError> {
        let url_chars = target_url.chars().count();
        if url_chars > MAX_TARGET_URL_LEN {
            return Err(AppError::bad_request(
                format!("Target URL must be at most {} characters", MAX_TARGET_URL_LEN),
                json!({ "provided_length": url_chars }),
            ));
        }

        let expires_at = match ttl_days {
            None => None,
            Some(days) if (1..=MAX_TTL_DAYS).contains(&days) => {
                Some(Utc::now() + Duration::days(i64::from(days)))
            }
            Some(days) => {
                return Err(AppError::bad_request(
                    format!("ttl_days must be between 1 and {}", MAX_TTL_DAYS),
                    json!({ "ttl_days": days }),
                ));
            }
        };

        let link = match custom_code {
            Some(code) => {
                validate_custom_code(&code)?;
                self.allocator.reserve_custom(&code).await?;

                self.repository
                    .insert_unique(NewShortLink {
                        code,
                        target_url,
                        expires_at,
                        is_custom: true,
                        created_by,
                    })
                    .await?
            }
            None => {
                self.insert_generated(target_url, expires_at, created_by)
                    .await?
            }
        };

        info!("Created short link {} (custom: {})", link.code, link.is_custom);
        metrics::counter!("links_created_total").increment(1);

        link_cache::populate(self.cache.as_ref(), &link, self.cache_ttl_seconds).await;

        Ok(link)
    }

    /// Inserts under a generated code, re-allocating if another writer took it first.
    async fn insert_generated(
        &self,
        target_url: String,
        expires_at: Option<chrono::DateTime<Utc>>,
        created_by: Option<String>,
    ) -> Result<ShortLink, AppError> {
        for round in 1..=INSERT_RACE_ROUNDS {
            let code = self.allocator.allocate_unique().await?;

            let result = self
                .repository
                .insert_unique(NewShortLink {
                    code: code.clone(),
                    target_url: target_url.clone(),
                    expires_at,
                    is_custom: false,
                    created_by: created_by.clone(),
                })
                .await;

            match result {
                Err(AppError::AlreadyTaken { .. }) => {
                    warn!("Lost insert race for {} (round {})", code, round);
                }
                other => return other,
            }
        }

        Err(AppError::allocation_exhausted(
            "Failed to allocate a unique code",
            json!({ "reason": "Concurrent inserts kept taking allocated codes" }),
        ))
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }
}
