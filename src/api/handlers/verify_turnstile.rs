//! `POST /api/verify-turnstile`
//!
//! Every outcome maps to a fixed status and `{ success, error, codes }` body.
//! Checks run in order: method, token, secret, authority verdict. Failures that
//! are not the caller's fault are logged here and reported as a bare 500.

use crate::api::{VerificationGateway, handlers::extract_client_ip};
use crate::turnstile::{ExternalServiceError, VerificationRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPayload {
    token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
}

impl VerifyResponse {
    fn accepted() -> Self {
        Self {
            success: true,
            error: None,
            codes: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Missing token")]
    MissingToken,
    #[error("Missing TURNSTILE_SECRET_KEY")]
    MissingSecret,
    #[error("Turnstile verification failed")]
    Rejected(Vec<String>),
    #[error("Internal Server Error")]
    Internal(#[from] ExternalServiceError),
}

impl GatewayError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingToken | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::MissingSecret | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = Some(self.to_string());
        let codes = match self {
            Self::Rejected(codes) => Some(codes),
            _ => None,
        };

        let body = VerifyResponse {
            success: false,
            error,
            codes,
        };

        (status, Json(body)).into_response()
    }
}

// The body is either the JSON object itself or a JSON string wrapping it.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenBody {
    Structured(TokenPayload),
    Encoded(String),
}

fn extract_token(body: &[u8]) -> Option<String> {
    let token = match serde_json::from_slice::<TokenBody>(body).ok()? {
        TokenBody::Structured(payload) => payload.token,
        TokenBody::Encoded(raw) => serde_json::from_str::<TokenPayload>(&raw).ok()?.token,
    };

    (!token.is_empty()).then_some(token)
}

#[utoipa::path(
    post,
    path= "/api/verify-turnstile",
    request_body = TokenPayload,
    responses (
        (status = 200, description = "Token accepted by Turnstile", body = VerifyResponse, content_type = "application/json"),
        (status = 400, description = "Missing token or verification failed", body = VerifyResponse),
        (status = 405, description = "Method other than POST", body = VerifyResponse),
        (status = 500, description = "Secret not configured or siteverify unavailable", body = VerifyResponse),
    ),
    tag = "gatekeeper",
)]
// axum handler for the Turnstile gateway
#[instrument(skip_all, fields(%method))]
pub async fn verify_turnstile(
    method: Method,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Extension(gateway): Extension<Arc<VerificationGateway>>,
    body: Bytes,
) -> Response {
    let peer = peer.map(|ConnectInfo(addr)| addr);

    match verify(&gateway, &method, &headers, peer, &body).await {
        Ok(()) => {
            debug!("Turnstile token accepted");
            (StatusCode::OK, Json(VerifyResponse::accepted())).into_response()
        }
        Err(err) => {
            match &err {
                GatewayError::Internal(source) => {
                    error!("Turnstile verification error: {source}");
                }
                GatewayError::MissingSecret => {
                    error!("TURNSTILE_SECRET_KEY is not configured");
                }
                GatewayError::Rejected(codes) => {
                    info!("Turnstile token rejected: {:?}", codes);
                }
                GatewayError::MethodNotAllowed | GatewayError::MissingToken => {
                    debug!("Bad verification request: {err}");
                }
            }
            err.into_response()
        }
    }
}

async fn verify(
    gateway: &VerificationGateway,
    method: &Method,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    body: &[u8],
) -> Result<(), GatewayError> {
    if *method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let token = extract_token(body).ok_or(GatewayError::MissingToken)?;

    // Fail closed: never call siteverify without a credential.
    let secret = gateway
        .secret()
        .cloned()
        .ok_or(GatewayError::MissingSecret)?;

    let request = VerificationRequest {
        token,
        secret,
        client_ip: extract_client_ip(headers, peer),
    };

    let verdict = gateway.verifier().verify(&request).await?;

    if verdict.accepted {
        Ok(())
    } else {
        Err(GatewayError::Rejected(verdict.diagnostic_codes))
    }
}
