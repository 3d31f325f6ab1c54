//! Reporting over the durable store.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Read-only reporting queries.
///
/// Reads go straight to the store, so counts reflect every click the worker has
/// applied so far; clicks still queued are not visible yet.
pub struct StatsService {
    repository: Arc<dyn LinkRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Returns the record for `code`, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn link_stats(&self, code: &str) -> Result<ShortLink, AppError> {
        self.repository
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    pub async fn links_for_target(&self, target_url: &str) -> Result<Vec<ShortLink>, AppError> {
        self.repository.find_by_target(target_url).await
    }

    pub async fn links_for_client(&self, client_key: &str) -> Result<Vec<ShortLink>, AppError> {
        self.repository.find_by_client(client_key).await
    }
}
