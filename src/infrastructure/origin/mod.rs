//! Client for the origin upstream that serves the application itself.
//!
//! Two things are fetched from the origin: the application markup (served to
//! browser navigations of short links) and any request the router does not
//! handle (passthrough).

mod http_origin;

use async_trait::async_trait;
use axum::{extract::Request, http::HeaderMap, response::Response};

pub use http_origin::HttpOrigin;

/// Errors talking to the origin upstream.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("no origin upstream is configured")]
    NotConfigured,

    #[error("origin request failed: {0}")]
    Upstream(String),

    #[error("origin answered with status {0}")]
    Status(u16),

    #[error("could not read request body: {0}")]
    Body(String),
}

/// Access to the origin upstream.
#[async_trait]
pub trait OriginClient: Send + Sync {
    /// Fetches the application markup (`GET /`).
    async fn fetch_shell(&self) -> Result<String, OriginError>;

    /// Proxies `request` to the origin and returns its response unchanged
    /// apart from hop-by-hop headers.
    async fn forward(&self, request: Request) -> Result<Response, OriginError>;
}

/// Origin used when `ORIGIN_UPSTREAM_URL` is unset.
pub struct NoOrigin;

#[async_trait]
impl OriginClient for NoOrigin {
    async fn fetch_shell(&self) -> Result<String, OriginError> {
        Err(OriginError::NotConfigured)
    }

    async fn forward(&self, _request: Request) -> Result<Response, OriginError> {
        Err(OriginError::NotConfigured)
    }
}

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Removes headers that only apply to a single transport hop.
pub(crate) fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}
