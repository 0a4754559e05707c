//! Baseline security headers for every response.

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), interest-cohort=()";
const HSTS: &str = "max-age=31536000; includeSubDomains";
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// Which header set a response receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// JSON API responses: baseline plus a locked-down CSP.
    Api,
    /// Everything else, including redirects and proxied pages.
    Page,
}

impl ResponseClass {
    pub fn for_path(path: &str) -> Self {
        if path == "/api" || path.starts_with("/api/") {
            ResponseClass::Api
        } else {
            ResponseClass::Page
        }
    }
}

/// Rebuilds `response` with the security headers of `class` overlaid.
///
/// Status, body and extensions are carried over; the original headers are
/// kept unless a security header overrides them.
pub fn wrap(response: Response, class: ResponseClass) -> Response {
    let (mut parts, body) = response.into_parts();
    let headers = &mut parts.headers;

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS),
    );

    if class == ResponseClass::Api {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(API_CSP),
        );
    }

    Response::from_parts(parts, body)
}

/// Middleware applying [`wrap`] to every response.
pub async fn layer(req: Request, next: Next) -> Response {
    let class = ResponseClass::for_path(req.uri().path());
    wrap(next.run(req).await, class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};

    #[test]
    fn test_wrap_keeps_status_and_existing_headers() {
        let response = Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, "https://app.example/")
            .body(Body::empty())
            .unwrap();

        let wrapped = wrap(response, ResponseClass::Page);

        assert_eq!(wrapped.status(), StatusCode::FOUND);
        assert_eq!(wrapped.headers()[header::LOCATION], "https://app.example/");
        assert_eq!(wrapped.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(wrapped.headers().get(header::STRICT_TRANSPORT_SECURITY).is_some());
        assert!(wrapped.headers().get(header::CONTENT_SECURITY_POLICY).is_none());
    }

    #[test]
    fn test_api_class_gets_csp() {
        let wrapped = wrap(Response::new(Body::empty()), ResponseClass::Api);
        assert_eq!(wrapped.headers()[header::CONTENT_SECURITY_POLICY], API_CSP);
    }

    #[test]
    fn test_wrap_overrides_weaker_upstream_values() {
        let response = Response::builder()
            .header(header::REFERRER_POLICY, "unsafe-url")
            .body(Body::empty())
            .unwrap();

        let wrapped = wrap(response, ResponseClass::Page);
        assert_eq!(
            wrapped.headers()[header::REFERRER_POLICY],
            "strict-origin-when-cross-origin"
        );
    }

    #[test]
    fn test_class_for_path() {
        assert_eq!(ResponseClass::for_path("/api/shorten"), ResponseClass::Api);
        assert_eq!(ResponseClass::for_path("/s/amber-coral-nova"), ResponseClass::Page);
        assert_eq!(ResponseClass::for_path("/apiary"), ResponseClass::Page);
    }
}
