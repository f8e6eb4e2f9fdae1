use anyhow::{Context, Result, ensure};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use gatekeeper::{
    api::{self, VERIFY_TURNSTILE_PATH, VerificationGateway},
    turnstile::SiteVerifier,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

const SECRET: &str = "1x0000000000000000000000000000000AA";
const TOKEN: &str = "XXXX.DUMMY.TOKEN.XXXX";

async fn app(server: &MockServer, secret: Option<&str>) -> Result<Router> {
    let url = Url::parse(&format!("{}/siteverify", server.uri()))?;
    let gateway = VerificationGateway::new(
        secret.map(|s| SecretString::from(s.to_string())),
        SiteVerifier::new(url)?,
    );
    Ok(api::router(Arc::new(gateway)))
}

fn post(body: impl Into<Body>) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(VERIFY_TURNSTILE_PATH)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())?)
}

async fn call(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await.context("router call failed")?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&body).context("response body is not JSON")?;
    Ok((status, json))
}

#[tokio::test]
async fn get_is_method_not_allowed() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(VERIFY_TURNSTILE_PATH)
        .body(Body::empty())?;
    let (status, body) = call(app(&server, Some(SECRET)).await?, request).await?;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"success": false, "error": "Method not allowed"}));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_bad_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = call(app(&server, Some(SECRET)).await?, post("{}")?).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Missing token"}));
    Ok(())
}

#[tokio::test]
async fn unset_secret_never_reaches_siteverify() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let payload = json!({"token": TOKEN}).to_string();
    let (status, body) = call(app(&server, None).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Missing TURNSTILE_SECRET_KEY"})
    );
    Ok(())
}

#[tokio::test]
async fn rejection_passes_codes_through() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error-codes": ["timeout-or-duplicate"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = json!({"token": TOKEN}).to_string();
    let (status, body) = call(app(&server, Some(SECRET)).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Turnstile verification failed",
            "codes": ["timeout-or-duplicate"],
        })
    );
    Ok(())
}

#[tokio::test]
async fn accepted_token_returns_bare_success() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/siteverify"))
        .and(body_string_contains(format!("response={TOKEN}")))
        .and(body_string_contains(format!("secret={SECRET}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "hostname": "example.com",
            "error-codes": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = json!({"token": TOKEN}).to_string();
    let (status, body) = call(app(&server, Some(SECRET)).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    Ok(())
}

#[tokio::test]
async fn json_string_body_is_accepted() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains(format!("response={TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    // The whole payload arrives as a JSON string literal.
    let payload = Value::String(json!({"token": TOKEN}).to_string()).to_string();
    let (status, body) = call(app(&server, Some(SECRET)).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    Ok(())
}

#[tokio::test]
async fn forwarded_client_ip_is_sent_as_remoteip() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("remoteip=203.0.113.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri(VERIFY_TURNSTILE_PATH)
        .header(CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(json!({"token": TOKEN}).to_string()))?;
    let (status, _) = call(app(&server, Some(SECRET)).await?, request).await?;

    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn malformed_siteverify_answer_is_generic_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let payload = json!({"token": TOKEN}).to_string();
    let (status, body) = call(app(&server, Some(SECRET)).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Internal Server Error"}));
    let error = body["error"].as_str().unwrap_or_default();
    ensure!(!error.contains("html"), "upstream body leaked: {error}");
    Ok(())
}

#[tokio::test]
async fn null_error_codes_is_plain_rejection() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error-codes": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = json!({"token": TOKEN}).to_string();
    let (status, body) = call(app(&server, Some(SECRET)).await?, post(payload)?).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Turnstile verification failed",
            "codes": [],
        })
    );
    Ok(())
}
