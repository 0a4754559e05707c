//! Origin classification and CORS handling.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

const PREFLIGHT_MAX_AGE: &str = "86400";
const ALLOWED_REQUEST_HEADERS: &str = "Content-Type, X-Admin-Token";

/// The set of origins trusted by the API.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Trusts `app_origin` plus the development allow-list.
    pub fn new(app_origin: &str, dev_origins: &[String]) -> Self {
        let mut allowed = vec![app_origin.trim_end_matches('/').to_string()];
        allowed.extend(dev_origins.iter().map(|o| o.trim_end_matches('/').to_string()));
        Self { allowed }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.origin_string(), &config.dev_origins)
    }

    /// Returns the request's `Origin` if it is trusted.
    pub fn allowed_origin<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let origin = headers.get(header::ORIGIN)?.to_str().ok()?;
        self.allowed
            .iter()
            .any(|allowed| allowed == origin)
            .then_some(origin)
    }

    /// Heuristic cross-site check for state-changing endpoints.
    ///
    /// True when `Origin` is trusted, or when it is absent and the browser
    /// reports `Sec-Fetch-Site: same-origin` or `same-site`. This is not a
    /// full CSRF defense.
    pub fn looks_same_origin(&self, headers: &HeaderMap) -> bool {
        if headers.contains_key(header::ORIGIN) {
            return self.allowed_origin(headers).is_some();
        }

        matches!(
            headers
                .get("sec-fetch-site")
                .and_then(|v| v.to_str().ok()),
            Some("same-origin" | "same-site")
        )
    }

    /// CORS response headers for a trusted origin, `None` otherwise.
    pub fn cors_headers(&self, headers: &HeaderMap, methods: &'static str) -> Option<HeaderMap> {
        let origin = self.allowed_origin(headers)?;
        let origin = HeaderValue::from_str(origin).ok()?;

        let mut cors = HeaderMap::new();
        cors.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        cors.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(methods),
        );
        cors.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_REQUEST_HEADERS),
        );
        cors.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        cors.insert(header::VARY, HeaderValue::from_static("Origin"));
        Some(cors)
    }
}

/// Methods offered by each CORS-enabled endpoint.
fn methods_for(path: &str) -> Option<&'static str> {
    match path {
        "/api/shorten" => Some("GET, POST, PUT, OPTIONS"),
        "/api/telemetry" => Some("GET, POST, DELETE, OPTIONS"),
        p if p.starts_with("/api/resolve/") => Some("GET, OPTIONS"),
        _ => None,
    }
}

/// Answers preflights and decorates API responses for trusted origins.
///
/// A preflight for a CORS-enabled endpoint never reaches a handler: it gets
/// `204` with CORS headers, or `403` for an untrusted origin. Other requests
/// pass through and gain CORS headers only when their origin is trusted.
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let methods = methods_for(req.uri().path());

    if req.method() == Method::OPTIONS
        && let Some(methods) = methods
    {
        return match state.origin_policy.cors_headers(req.headers(), methods) {
            Some(cors) => (StatusCode::NO_CONTENT, cors).into_response(),
            None => AppError::forbidden(
                "Origin not allowed",
                json!({ "hint": "preflight is only answered for the application's own origins" }),
            )
            .into_response(),
        };
    }

    let cors = methods.and_then(|m| state.origin_policy.cors_headers(req.headers(), m));

    let mut response = next.run(req).await;

    if let Some(cors) = cors {
        merge_headers(response.headers_mut(), &cors);
    }

    response
}

fn merge_headers(target: &mut HeaderMap, extra: &HeaderMap) {
    for (name, value) in extra {
        if *name == header::VARY {
            target.append(name.clone(), value.clone());
        } else {
            target.insert(name.clone(), value.clone());
        }
    }
}
