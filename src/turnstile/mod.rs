//! Client for the Cloudflare Turnstile `siteverify` endpoint.
//!
//! The authority answers every form submission with a JSON object; approval is
//! signalled by `success: true`, rejections carry an `error-codes` array that is
//! passed back to callers untouched. Anything that prevents us from reading a
//! verdict (transport failure, a body that is not a JSON object) is an
//! [`ExternalServiceError`]. Inside the object, anything but `success: true` is a
//! rejection and a missing or `null` code list is an empty one.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

const CONNECT_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("siteverify request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed siteverify response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Inputs for one verification round trip. Built per inbound call.
#[derive(Debug)]
pub struct VerificationRequest {
    pub token: String,
    pub secret: SecretString,
    pub client_ip: Option<String>,
}

/// Normalized outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVerdict {
    pub accepted: bool,
    pub diagnostic_codes: Vec<String>,
}

#[derive(Serialize)]
struct SiteVerifyForm<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

// Only `success` and `error-codes` drive the verdict; the rest is logged.
#[derive(Deserialize, Debug)]
struct SiteVerifyResponse {
    #[serde(default, deserialize_with = "only_true")]
    success: bool,
    #[serde(rename = "error-codes", default, deserialize_with = "codes_or_empty")]
    error_codes: Vec<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    hostname: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    action: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    challenge_ts: Option<String>,
}

fn only_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

// Codes are passed on as sent; a lone string counts as one code.
fn codes_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(code) => code,
                other => other.to_string(),
            })
            .collect(),
        Value::String(code) if !code.is_empty() => vec![code],
        _ => Vec::new(),
    })
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

impl From<SiteVerifyResponse> for VerificationVerdict {
    fn from(response: SiteVerifyResponse) -> Self {
        Self {
            accepted: response.success,
            diagnostic_codes: response.error_codes,
        }
    }
}

/// Reusable handle on the verification authority.
#[derive(Debug, Clone)]
pub struct SiteVerifier {
    client: Client,
    url: Url,
}

impl SiteVerifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url) -> Result<Self, ExternalServiceError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Submit the token to the authority and normalize its answer.
    ///
    /// The HTTP status of the answer is not inspected: the authority reports
    /// rejections in the body, and a body that is not a verdict is malformed.
    ///
    /// # Errors
    /// Returns [`ExternalServiceError`] if the authority is unreachable or its
    /// payload cannot be decoded.
    #[instrument(skip(self, request), fields(url = %self.url, has_ip = request.client_ip.is_some()))]
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationVerdict, ExternalServiceError> {
        let form = SiteVerifyForm {
            secret: request.secret.expose_secret(),
            response: &request.token,
            remoteip: request.client_ip.as_deref(),
        };

        let response = self.client.post(self.url.clone()).form(&form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Derived structs also accept arrays; a verdict is always an object.
        let value: Value = serde_json::from_slice(&body)?;
        if !value.is_object() {
            return Err(ExternalServiceError::MalformedResponse(
                serde::de::Error::custom("siteverify answer is not a JSON object"),
            ));
        }
        let parsed: SiteVerifyResponse = serde_json::from_value(value)?;

        debug!(
            %status,
            success = parsed.success,
            hostname = parsed.hostname.as_deref().unwrap_or("-"),
            action = parsed.action.as_deref().unwrap_or("-"),
            challenge_ts = parsed.challenge_ts.as_deref().unwrap_or("-"),
            "siteverify answered"
        );

        Ok(parsed.into())
    }
}
