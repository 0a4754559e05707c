//! Handlers for the link shortening endpoints.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{
    EndpointUsage, RateLimitUsage, ShortenRequest, ShortenResponse, UpdateLinkRequest,
    UpdateLinkResponse, UsageResponse,
};
use crate::api::extract::{BoundedJson, LINK_BODY_LIMIT};
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or returns) the short link for an application URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://app.example/#state" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "shortUrl": "https://app.example/s/amber-coral-nova",
///   "code": "amber-coral-nova",
///   "existing": false
/// }
/// ```
///
/// # Errors
///
/// - `400` for malformed JSON, an invalid URL or a foreign origin
/// - `403` / `429` from the request guard
/// - `413` for bodies over 16 KiB
/// - `500` when the store is unconfigured or failing
pub async fn create_link_handler(
    State(state): State<AppState>,
    BoundedJson(payload): BoundedJson<ShortenRequest, LINK_BODY_LIMIT>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let created = state.links()?.create(&payload.url).await?;

    Ok(Json(ShortenResponse {
        short_url: state.config.short_url(created.code.as_str()),
        code: created.code.to_string(),
        existing: created.existing,
    }))
}

/// Repoints an existing code at a new application URL.
///
/// # Endpoint
///
/// `PUT /api/shorten` with `{ "code": "...", "url": "..." }`
///
/// On change, the cached redirect for `/s/<code>` is evicted. Eviction
/// failures are logged; the update itself has already succeeded.
///
/// # Errors
///
/// Same as [`create_link_handler`], plus `404` for an unknown code.
pub async fn update_link_handler(
    State(state): State<AppState>,
    BoundedJson(payload): BoundedJson<UpdateLinkRequest, LINK_BODY_LIMIT>,
) -> Result<Json<UpdateLinkResponse>, AppError> {
    payload.validate()?;

    let result = state.links()?.update(&payload.code, &payload.url).await?;

    if result.updated {
        let path = result.code.public_path();
        match state.cache.delete(&path).await {
            Ok(true) => tracing::debug!(%path, "Evicted cached redirect"),
            Ok(false) => {}
            Err(e) => tracing::warn!(%path, error = %e, "Failed to evict cached redirect"),
        }
    }

    Ok(Json(UpdateLinkResponse {
        short_url: state.config.short_url(result.code.as_str()),
        code: result.code.to_string(),
        updated: result.updated,
    }))
}

/// Describes the API.
///
/// # Endpoint
///
/// `GET /api/shorten`
pub async fn usage_handler(State(state): State<AppState>) -> Json<UsageResponse> {
    let limits = state.limiter.limits();

    Json(UsageResponse {
        service: "share-links",
        endpoints: vec![
            EndpointUsage {
                method: "POST",
                path: "/api/shorten",
                body: Some(r#"{"url":"<application URL>"}"#),
            },
            EndpointUsage {
                method: "PUT",
                path: "/api/shorten",
                body: Some(r#"{"code":"<code>","url":"<application URL>"}"#),
            },
            EndpointUsage {
                method: "GET",
                path: "/api/resolve/<code>",
                body: None,
            },
            EndpointUsage {
                method: "GET",
                path: "/s/<code>",
                body: None,
            },
        ],
        code_shapes: vec!["word-word-word", "8 hex digits", "6-character legacy code"],
        rate_limits: RateLimitUsage {
            window_seconds: limits.window.as_secs(),
            create: limits.create,
            update: limits.update,
            telemetry: limits.telemetry,
        },
    })
}
