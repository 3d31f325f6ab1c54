//! Client identity extraction for rate limiting.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const UNKNOWN_CLIENT: &str = "unknown";

/// Derives the rate-limit identity for a request.
///
/// When `behind_proxy` is set, the first address of `X-Forwarded-For` wins, then
/// `X-Real-IP`. Otherwise, or when neither header is usable, the peer socket IP is
/// used. Requests with no identity at all share the `"unknown"` bucket.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_key(&headers, None, true), "203.0.113.7");
/// ```
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip;
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}
