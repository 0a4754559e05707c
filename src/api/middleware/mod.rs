//! HTTP middleware for request processing and protection.
//!
//! Layers run outermost first: tracing, security headers, CORS, then the
//! per-route origin and rate-limit guard.

pub mod cors;
pub mod guard;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;
