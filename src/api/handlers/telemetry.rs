//! Handlers for the telemetry endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};

use crate::api::dto::telemetry::{OkResponse, TelemetryRequest};
use crate::api::extract::{BoundedJson, TELEMETRY_BODY_LIMIT};
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the operator secret for resets.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Merges a batch of counter deltas.
///
/// # Endpoint
///
/// `POST /api/telemetry`
///
/// # Request Body
///
/// ```json
/// {
///   "increments": { "saveClicks": 1 },
///   "nested": { "countries": { "US": 1 } }
/// }
/// ```
///
/// Unknown metrics and bad deltas are dropped without failing the request.
///
/// # Errors
///
/// - `400` if neither section is present or the body is not JSON
/// - `413` for bodies over 8 KiB
/// - `500` when the store is unconfigured or failing
pub async fn post_telemetry_handler(
    State(state): State<AppState>,
    BoundedJson(payload): BoundedJson<TelemetryRequest, TELEMETRY_BODY_LIMIT>,
) -> Result<Json<OkResponse>, AppError> {
    state
        .telemetry()?
        .record(payload.increments.as_ref(), payload.nested.as_ref())
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// Returns the current aggregate. Never cached.
///
/// # Endpoint
///
/// `GET /api/telemetry`
pub async fn get_telemetry_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = state.telemetry()?.snapshot().await;

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(aggregate)))
}

/// Resets all counters.
///
/// # Endpoint
///
/// `DELETE /api/telemetry` with `X-Admin-Token: <secret>`
///
/// # Errors
///
/// - `403` without a valid token (unless the insecure opt-in is set)
/// - `500` when the store is unconfigured or failing
pub async fn delete_telemetry_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, AppError> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    state.auth.authorize_reset(presented)?;
    state.telemetry()?.reset().await?;

    Ok(Json(OkResponse::with_message("Telemetry counters reset")))
}
