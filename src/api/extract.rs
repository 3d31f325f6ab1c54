//! Custom request extractors.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::state::AppState;
use crate::utils::client_key::client_key;

/// Identity of the calling client, used for rate limiting and `created_by`.
///
/// Resolved from the peer socket address, or from proxy headers when the service
/// runs with `BEHIND_PROXY`. Never rejects: an unidentifiable client is `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientKey(client_key(&parts.headers, peer, state.behind_proxy)))
    }
}
