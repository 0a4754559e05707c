//! reqwest-backed origin client.

use super::{OriginClient, OriginError, strip_hop_by_hop};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header},
    response::Response,
};
use std::time::Duration;

/// Largest request body forwarded to the origin.
const MAX_FORWARD_BODY: usize = 2 * 1024 * 1024;

/// Forwards requests to a fixed upstream base URL.
pub struct HttpOrigin {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrigin {
    /// Builds a client for `base_url` (scheme, host and optional port).
    ///
    /// Redirects from the upstream are passed back to the caller, not followed.
    ///
    /// # Errors
    ///
    /// Returns [`OriginError::Upstream`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OriginError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| OriginError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OriginClient for HttpOrigin {
    async fn fetch_shell(&self) -> Result<String, OriginError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .header(header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| OriginError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OriginError::Status(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| OriginError::Upstream(e.to_string()))
    }

    async fn forward(&self, request: Request) -> Result<Response, OriginError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_FORWARD_BODY)
            .await
            .map_err(|e| OriginError::Body(e.to_string()))?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);

        let upstream = self
            .client
            .request(parts.method, format!("{}{}", self.base_url, path_and_query))
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| OriginError::Upstream(e.to_string()))?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| OriginError::Upstream(e.to_string()))?;

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
