//! Health probe.
//!
//! The gateway has no database; the only thing that can leave it unable to serve
//! is a missing siteverify secret, so that is what the probe reports.

use crate::{GIT_COMMIT_HASH, api::VerificationGateway};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    turnstile_secret: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Gateway is configured", body = Health),
        (status = 503, description = "Siteverify secret is missing", body = Health)
    ),
    tag = "health",
)]
// axum handler for health
pub async fn health(
    method: Method,
    Extension(gateway): Extension<Arc<VerificationGateway>>,
) -> impl IntoResponse {
    let configured = gateway.secret().is_some();
    if !configured {
        warn!("TURNSTILE_SECRET_KEY is not configured, verifications will fail");
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        turnstile_secret: if configured { "ok" } else { "missing" }.to_string(),
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .unwrap_or_else(|err| {
            debug!("Failed to parse X-App header: {}", err);
            HeaderMap::new()
        });

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let status = if configured {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, body)
}
