//! Handler for listing links by target URL.

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::stats::{LinkListResponse, LinksQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Lists every short link that points at a target URL, newest first.
///
/// # Endpoint
///
/// `GET /api/links?target_url=https://example.com`
///
/// # Errors
///
/// Returns 400 Bad Request if `target_url` is missing or empty.
pub async fn links_by_target_handler(
    State(state): State<AppState>,
    Query(query): Query<LinksQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    query.validate()?;

    let links = state
        .stats_service
        .links_for_target(&query.target_url)
        .await?;

    Ok(Json(LinkListResponse {
        target_url: query.target_url,
        total: links.len(),
        items: links.into_iter().map(Into::into).collect(),
    }))
}
