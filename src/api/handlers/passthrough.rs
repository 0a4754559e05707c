//! Fallback handler forwarding unmatched requests to the origin upstream.

use axum::{
    extract::{Request, State},
    response::Response,
};
use serde_json::json;

use crate::error::AppError;
use crate::infrastructure::origin::OriginError;
use crate::state::AppState;

/// Proxies any request the router does not handle.
///
/// # Errors
///
/// - `404` when no origin upstream is configured
/// - `502` when the upstream cannot be reached or read
pub async fn passthrough_handler(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, AppError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match state.origin.forward(req).await {
        Ok(response) => Ok(response),
        Err(OriginError::NotConfigured) => Err(AppError::not_found(
            "No route matches this request",
            json!({ "method": method.as_str(), "path": path }),
        )),
        Err(OriginError::Body(reason)) => Err(AppError::bad_request(
            "Request body could not be forwarded",
            json!({ "reason": reason }),
        )),
        Err(e) => Err(AppError::Upstream {
            message: format!("{method} {path}: {e}"),
        }),
    }
}
