pub mod health;
pub mod root;
pub mod verify_turnstile;

// common functions for the handlers
use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolve the caller's IP from proxy headers, falling back to the socket peer.
pub(crate) fn extract_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        // IPv4 peers reach the `::` listener as IPv4-mapped addresses.
        .or_else(|| peer.map(|addr| addr.ip().to_canonical().to_string()))
}
