//! Handler for code resolution.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::resolve::ResolveResponse;
use crate::domain::short_code::ShortCode;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the URL behind a code without redirecting.
///
/// # Endpoint
///
/// `GET /api/resolve/{code}`
///
/// # Errors
///
/// - `400` if the code matches no accepted shape
/// - `404` if the code is unknown
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path(raw_code): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let code = ShortCode::parse(&raw_code)?;
    let url = state.links()?.resolve(&code).await?;

    Ok(Json(ResolveResponse {
        url,
        code: code.to_string(),
    }))
}
