//! Application error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, AppError>`. The response body always has the
//! shape `{"error": {"code", "message", "details"}}`. Internal failures are logged
//! with their cause and answered with a generic message.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::infrastructure::kv::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation { message: String, details: Value },

    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String, details: Value },

    #[error("forbidden: {message}")]
    Forbidden { message: String, details: Value },

    #[error("not found: {message}")]
    NotFound { message: String, details: Value },

    #[error("rate limited on bucket {bucket}")]
    RateLimited { bucket: &'static str },

    #[error("store binding {binding} is not configured")]
    Unconfigured { binding: &'static str },

    #[error("could not generate an unused short code")]
    GenerationExhausted,

    #[error("origin upstream failed: {message}")]
    Upstream { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge {
            message: "Request body is too large".to_string(),
            details: json!({ "limit_bytes": limit }),
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Unconfigured { .. } | Self::GenerationExhausted | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into the public payload, dropping internal detail.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            Self::Validation { message, details } => {
                ("validation_error", message.clone(), details.clone())
            }
            Self::PayloadTooLarge { message, details } => {
                ("payload_too_large", message.clone(), details.clone())
            }
            Self::Forbidden { message, details } => ("forbidden", message.clone(), details.clone()),
            Self::NotFound { message, details } => ("not_found", message.clone(), details.clone()),
            Self::RateLimited { bucket } => (
                "rate_limited",
                "Too many requests, slow down".to_string(),
                json!({ "bucket": bucket }),
            ),
            Self::Unconfigured { binding } => (
                "unconfigured",
                "Service storage is not configured".to_string(),
                json!({ "binding": binding, "hint": format!("set {binding} and restart the service") }),
            ),
            Self::GenerationExhausted => (
                "generation_exhausted",
                "Could not allocate a short code, try again".to_string(),
                json!({}),
            ),
            Self::Upstream { .. } => (
                "upstream_error",
                "Origin server is unavailable".to_string(),
                json!({}),
            ),
            Self::Internal { .. } => (
                "internal_error",
                "Internal server error".to_string(),
                json!({}),
            ),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Internal { message } => tracing::error!(%message, "request failed"),
            Self::Unconfigured { binding } => {
                tracing::error!(binding, "request hit an unconfigured store binding")
            }
            Self::GenerationExhausted => tracing::error!("short code space exhausted"),
            Self::Upstream { message } => tracing::warn!(%message, "origin upstream failed"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        );
        response
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::internal(format!("store operation failed: {err}"))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();

        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": errors.to_string() }),
        )
    }
}
