//! Request extractors shared by the API handlers.

use axum::{
    extract::{ConnectInfo, FromRequest, Request},
    http::{Extensions, HeaderMap, header},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::net::SocketAddr;

use crate::error::AppError;

/// Body limit for link create/update requests.
pub const LINK_BODY_LIMIT: usize = 16 * 1024;

/// Body limit for telemetry posts.
pub const TELEMETRY_BODY_LIMIT: usize = 8 * 1024;

/// JSON body extractor with a hard size limit.
///
/// Bodies over `LIMIT` bytes are rejected with `413`; anything that is not
/// valid JSON for `T` is rejected with `400`. The `Content-Type` header is
/// not checked, so beacon-style `text/plain` posts are accepted.
pub struct BoundedJson<T, const LIMIT: usize>(pub T);

impl<S, T, const LIMIT: usize> FromRequest<S> for BoundedJson<T, LIMIT>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());

        if declared.is_some_and(|len| len > LIMIT) {
            return Err(AppError::payload_too_large(LIMIT));
        }

        let bytes = axum::body::to_bytes(req.into_body(), LIMIT)
            .await
            .map_err(|_| AppError::payload_too_large(LIMIT))?;

        serde_json::from_slice(&bytes).map(BoundedJson).map_err(|e| {
            AppError::bad_request(
                "Malformed JSON body",
                json!({ "reason": e.to_string() }),
            )
        })
    }
}

/// Identity used for rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Derives the client identity of a request.
    ///
    /// Behind a trusted proxy the first of `CF-Connecting-IP`, the first
    /// `X-Forwarded-For` hop and `X-Real-IP` wins. Otherwise the socket peer
    /// is used. `unknown` when neither is available.
    pub fn resolve(headers: &HeaderMap, extensions: &Extensions, behind_proxy: bool) -> Self {
        if behind_proxy
            && let Some(ip) = forwarded_ip(headers)
        {
            return Self(ip);
        }

        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| Self(addr.ip().to_string()))
            .unwrap_or_else(|| Self("unknown".to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    value("cf-connecting-ip")
        .or_else(|| {
            value("x-forwarded-for")
                .and_then(|list| list.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .or_else(|| value("x-real-ip"))
        .map(str::to_string)
}
