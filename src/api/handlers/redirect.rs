//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. [`crate::application::services::Resolver`] checks the cache, then the store
/// 2. A click event is queued for the background worker
/// 3. Returns 307 Temporary Redirect
///
/// Cache failures fall back to the store and never surface here.
///
/// # Errors
///
/// - 404 Not Found if the code doesn't exist
/// - 410 Gone if the link has expired
/// - 500 Internal Server Error if the store is unavailable
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target_url = state.resolver.resolve(&code).await?;

    Ok(Redirect::temporary(&target_url))
}
