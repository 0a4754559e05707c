//! DTOs for the telemetry endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `POST /api/telemetry` body.
///
/// Values are kept loosely typed here; each entry is checked and dropped
/// individually by the telemetry policy.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryRequest {
    pub increments: Option<Map<String, Value>>,
    pub nested: Option<Map<String, Value>>,
}

/// Acknowledgement for telemetry writes.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn with_message(message: &'static str) -> Self {
        Self {
            ok: true,
            message: Some(message),
        }
    }
}
