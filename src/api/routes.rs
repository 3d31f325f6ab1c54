//! API route configuration.
//!
//! Each route carries the rate limit policy for its operation.

use crate::api::handlers::{links_by_target_handler, shorten_handler, stats_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST /shorten`         - Create a short link (`create` policy)
/// - `GET  /stats/{code}`    - Statistics for one link (`analytics` policy)
/// - `GET  /links`           - Links for a target URL (`analytics` policy)
pub fn api_routes(state: AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_create,
        ));

    let analytics = Router::new()
        .route("/stats/{code}", get(stats_handler))
        .route("/links", get(links_by_target_handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            rate_limit::limit_analytics,
        ));

    Router::new().merge(create).merge(analytics)
}
