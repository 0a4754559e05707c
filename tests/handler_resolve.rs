mod common;

use common::{APP_ORIGIN, TestOptions, default_app, spawn_app};
use serde_json::json;
use share_links::infrastructure::kv::KvStore;

#[tokio::test]
async fn test_resolve_success() {
    let app = spawn_app(TestOptions {
        codes: vec!["amber-coral-nova"],
        ..Default::default()
    });

    app.server
        .post("/api/shorten")
        .add_header("Origin", APP_ORIGIN)
        .json(&json!({ "url": "https://app.example/#plan=1" }))
        .await;

    let response = app.server.get("/api/resolve/amber-coral-nova").await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["url"], "https://app.example/#plan=1");
    assert_eq!(body["code"], "amber-coral-nova");
}

#[tokio::test]
async fn test_resolve_legacy_code() {
    let app = default_app();
    app.links
        .put("code:aB3dE9", "https://app.example/#old")
        .await
        .unwrap();

    let body = app
        .server
        .get("/api/resolve/aB3dE9")
        .await
        .json::<serde_json::Value>();

    assert_eq!(body["url"], "https://app.example/#old");
}

#[tokio::test]
async fn test_resolve_unknown_code() {
    let app = default_app();

    let response = app.server.get("/api/resolve/amber-coral-nova").await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "not_found"
    );
}

#[tokio::test]
async fn test_resolve_malformed_code() {
    let app = default_app();

    let response = app.server.get("/api/resolve/NOT-A-CODE").await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_resolve_needs_no_origin_header() {
    let app = default_app();
    app.links
        .put("code:0badf00d", "https://app.example/#hex")
        .await
        .unwrap();

    let response = app
        .server
        .get("/api/resolve/0badf00d")
        .add_header("Origin", "https://evil.example")
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}
