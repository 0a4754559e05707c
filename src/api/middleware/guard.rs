//! Origin and rate-limit gate for the API endpoints.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::api::extract::ClientId;
use crate::api::middleware::rate_limit::Bucket;
use crate::error::AppError;
use crate::state::AppState;

/// What a route requires before its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RoutePolicy {
    same_origin: bool,
    bucket: Option<Bucket>,
}

fn policy_for(method: &Method, path: &str) -> Option<RoutePolicy> {
    let policy = |bucket| RoutePolicy {
        same_origin: true,
        bucket,
    };

    match (method, path) {
        (&Method::POST, "/api/shorten") => Some(policy(Some(Bucket::Create))),
        (&Method::PUT, "/api/shorten") => Some(policy(Some(Bucket::Update))),
        (&Method::POST, "/api/telemetry") => Some(policy(Some(Bucket::Telemetry))),
        (&Method::GET, "/api/telemetry") => Some(policy(None)),
        _ => None,
    }
}

/// Rejects cross-site callers and enforces per-bucket ceilings.
///
/// Runs before any body is read, so rejected requests never touch a store.
///
/// # Errors
///
/// - `403 Forbidden` when the request does not look same-origin
/// - `429 Too Many Requests` when the client exhausted its bucket
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(policy) = policy_for(req.method(), req.uri().path()) else {
        return Ok(next.run(req).await);
    };

    if policy.same_origin && !state.origin_policy.looks_same_origin(req.headers()) {
        return Err(AppError::forbidden(
            "Cross-site request rejected",
            json!({ "hint": "call this endpoint from the application itself" }),
        ));
    }

    if let Some(bucket) = policy.bucket {
        let client = ClientId::resolve(req.headers(), req.extensions(), state.config.behind_proxy);
        if !state.limiter.allow(bucket, client.as_str()) {
            return Err(AppError::RateLimited {
                bucket: bucket.as_str(),
            });
        }
    }

    Ok(next.run(req).await)
}
