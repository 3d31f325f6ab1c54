//! Fixed-window rate limiting middleware backed by [`RateGovernor`].
//!
//! One middleware per named policy. Counters live in the shared cache, so every
//! instance of the service sees the same window.
//!
//! [`RateGovernor`]: crate::application::services::RateGovernor

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::extract::ClientKey;
use crate::application::services::Operation;
use crate::error::AppError;
use crate::state::AppState;

/// Applies the `create` policy.
///
/// # Example
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::limit_create));
/// ```
pub async fn limit_create(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, &client, Operation::Create, request, next).await
}

/// Applies the `resolve` policy.
pub async fn limit_resolve(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, &client, Operation::Resolve, request, next).await
}

/// Applies the `analytics` policy.
pub async fn limit_analytics(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, &client, Operation::Analytics, request, next).await
}

/// Denied requests get `429 Too Many Requests` with `Retry-After`.
async fn enforce(
    state: &AppState,
    client: &str,
    operation: Operation,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state
        .rate_governor
        .check(client, operation)
        .await
        .into_result()?;

    Ok(next.run(request).await)
}
