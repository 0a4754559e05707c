mod common;

use axum::http::Method;
use common::{APP_ORIGIN, default_app};

#[tokio::test]
async fn test_preflight_from_trusted_origin() {
    let app = default_app();

    let response = app
        .server
        .method(Method::OPTIONS, "/api/shorten")
        .add_header("Origin", APP_ORIGIN)
        .add_header("Access-Control-Request-Method", "POST")
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(response.header("access-control-allow-origin"), APP_ORIGIN);
    assert_eq!(
        response.header("access-control-allow-methods"),
        "GET, POST, PUT, OPTIONS"
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        "Content-Type, X-Admin-Token"
    );
    assert_eq!(response.header("access-control-max-age"), "86400");
    assert!(app.origin.forwarded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_preflight_from_dev_origin() {
    let app = default_app();

    let response = app
        .server
        .method(Method::OPTIONS, "/api/telemetry")
        .add_header("Origin", "http://localhost:8787")
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(
        response.header("access-control-allow-origin"),
        "http://localhost:8787"
    );
    assert_eq!(
        response.header("access-control-allow-methods"),
        "GET, POST, DELETE, OPTIONS"
    );
}

#[tokio::test]
async fn test_preflight_from_untrusted_origin() {
    let app = default_app();

    let response = app
        .server
        .method(Method::OPTIONS, "/api/shorten")
        .add_header("Origin", "https://evil.example")
        .await;

    assert_eq!(response.status_code(), 403);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_api_response_gets_cors_and_security_headers() {
    let app = default_app();

    let response = app
        .server
        .get("/api/shorten")
        .add_header("Origin", APP_ORIGIN)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("access-control-allow-origin"), APP_ORIGIN);
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(
        response.header("referrer-policy"),
        "strict-origin-when-cross-origin"
    );
    assert!(response.headers().contains_key("permissions-policy"));
    assert!(response.headers().contains_key("strict-transport-security"));
    assert_eq!(
        response.header("content-security-policy"),
        "default-src 'none'; frame-ancestors 'none'"
    );
}

#[tokio::test]
async fn test_error_responses_keep_security_headers() {
    let app = default_app();

    let response = app.server.get("/api/resolve/amber-coral-nova").await;

    response.assert_status_not_found();
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_redirect_gets_baseline_without_csp() {
    let app = default_app();

    let response = app.server.get("/s/amber-coral-nova").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert!(response.headers().contains_key("strict-transport-security"));
    assert!(!response.headers().contains_key("content-security-policy"));
}
