//! Cache-aside resolution of short codes.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::link_cache;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Resolves short codes to target URLs.
///
/// # Request Flow
///
/// 1. Look the code up in the cache
/// 2. On a miss, read the store and repopulate the cache
/// 3. Enqueue a click event for the background worker
///
/// The cache is best-effort: its failures read as misses, so resolution stays correct
/// with the cache down. Store failures propagate. Click accounting never delays or
/// fails the result.
pub struct Resolver {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
    cache_ttl_seconds: u64,
}

impl Resolver {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            repository,
            cache,
            click_sender,
            cache_ttl_seconds,
        }
    }

    /// Returns the target URL for `code`.
    ///
    /// A cached projection is honoured only while its recorded expiry is in the
    /// future; a stale entry for an expired link is deleted and reported as expired.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record exists
    /// - [`AppError::Expired`] if the record is past its expiry
    /// - [`AppError::Internal`] on store errors or timeouts
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if let Some(cached) = link_cache::lookup(self.cache.as_ref(), code).await {
            if cached.is_expired() {
                link_cache::invalidate(self.cache.as_ref(), code).await;
                return Err(expired(code));
            }

            self.record_click(code);
            return Ok(cached.target_url);
        }

        let link = self
            .repository
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if link.is_expired() {
            link_cache::invalidate(self.cache.as_ref(), code).await;
            return Err(expired(code));
        }

        link_cache::populate(self.cache.as_ref(), &link, self.cache_ttl_seconds).await;
        self.record_click(code);

        Ok(link.target_url)
    }

    /// Hands a click to the background worker without waiting.
    fn record_click(&self, code: &str) {
        match self.click_sender.try_send(ClickEvent::new(code)) {
            Ok(()) => debug!("Click queued for {}", code),
            Err(TrySendError::Full(_)) => {
                warn!("Click queue full, dropping click for {}", code);
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Click queue closed, dropping click for {}", code);
                metrics::counter!("clicks_dropped_total", "reason" => "queue_closed")
                    .increment(1);
            }
        }
    }
}

fn expired(code: &str) -> AppError {
    AppError::expired("Short link has expired", json!({ "code": code }))
}
