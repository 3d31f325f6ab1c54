//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (`resolve` policy)
//! - `GET  /health`      - Health check: DB, cache, click queue
//! - `/api/*`            - REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window, counted in the shared cache
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Client identity for rate limiting follows `state.behind_proxy`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and per-route middleware, without path normalization.
pub fn router(state: AppState) -> Router {
    let redirect = Router::new()
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_resolve,
        ));

    Router::new()
        .merge(redirect)
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes(state.clone()))
        .with_state(state)
        .layer(tracing::layer())
}
