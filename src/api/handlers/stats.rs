//! Handler for per-link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::LinkStatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click statistics for a short link.
///
/// # Endpoint
///
/// `GET /api/stats/{code}`
///
/// Expired links are still reported, with `expired: true`.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let link = state.stats_service.link_stats(&code).await?;

    Ok(Json(link.into()))
}
