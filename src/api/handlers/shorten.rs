//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::extract::ClientKey;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_code": "my-link",
///   "ttl_days": 30
/// }
/// ```
///
/// `custom_code` and `ttl_days` are optional.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "code": "my-link",
///   "short_url": "https://sho.rt/my-link",
///   "target_url": "https://example.com/some/long/path",
///   "created_at": "2026-01-01T00:00:00Z",
///   "expires_at": "2026-01-31T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the custom code is taken
/// - 503 Service Unavailable if no free code could be allocated
pub async fn shorten_handler(
    State(state): State<AppState>,
    ClientKey(created_by): ClientKey,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(
            payload.url,
            payload.custom_code,
            payload.ttl_days,
            Some(created_by),
        )
        .await?;

    let short_url = state.link_service.short_url(&link.code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(link, short_url)),
    ))
}
