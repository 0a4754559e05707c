//! DTO for the resolve endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub url: String,
    pub code: String,
}
