//! Repository trait for the durable short link store.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable, authoritative storage for short link records.
///
/// Implementations must enforce code uniqueness atomically at the storage layer:
/// several service instances may insert concurrently, and no in-process lock is
/// held around [`LinkRepository::insert_unique`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a record by its short code.
    ///
    /// Expired records are returned as-is; callers check expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors or timeouts.
    async fn get(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Inserts a record unless its code is already present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyTaken`] if the code exists. The check and the
    /// insert are a single atomic statement.
    ///
    /// Returns [`AppError::Internal`] on database errors or timeouts.
    async fn insert_unique(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Adds one click and stamps `last_accessed_at`.
    ///
    /// Best-effort: a missing code is not an error.
    async fn increment_clicks(&self, code: &str, at: DateTime<Utc>) -> Result<(), AppError>;

    /// Lists records pointing at `target_url`, newest first.
    async fn find_by_target(&self, target_url: &str) -> Result<Vec<ShortLink>, AppError>;

    /// Lists records created by the given client identity, newest first.
    async fn find_by_client(&self, client_key: &str) -> Result<Vec<ShortLink>, AppError>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
