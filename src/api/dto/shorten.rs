//! DTOs for the link shortening endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /api/shorten` body.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Application URL to shorten; must be on the application's origin.
    #[validate(length(min = 1, max = 4096))]
    pub url: String,
}

/// `PUT /api/shorten` body.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,

    #[validate(length(min = 1, max = 4096))]
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
    pub code: String,
    pub existing: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkResponse {
    pub short_url: String,
    pub code: String,
    pub updated: bool,
}

/// Self-description served on `GET /api/shorten`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub service: &'static str,
    pub endpoints: Vec<EndpointUsage>,
    pub code_shapes: Vec<&'static str>,
    pub rate_limits: RateLimitUsage,
}

#[derive(Debug, Serialize)]
pub struct EndpointUsage {
    pub method: &'static str,
    pub path: &'static str,
    pub body: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitUsage {
    pub window_seconds: u64,
    pub create: u32,
    pub update: u32,
    pub telemetry: u32,
}
