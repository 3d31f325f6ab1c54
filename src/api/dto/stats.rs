//! DTOs for reporting endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Statistics for a single short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkStatsResponse {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub is_custom: bool,
}

impl From<ShortLink> for LinkStatsResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            expired: link.is_expired(),
            code: link.code,
            target_url: link.target_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            last_accessed_at: link.last_accessed_at,
            is_custom: link.is_custom,
        }
    }
}

/// Query parameters for `GET /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct LinksQuery {
    #[validate(length(min = 1, max = 2048))]
    pub target_url: String,
}

/// Links sharing a target URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub target_url: String,
    pub total: usize,
    pub items: Vec<LinkStatsResponse>,
}
