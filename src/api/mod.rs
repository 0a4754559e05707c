//! HTTP layer: request/response types, handlers, middleware and routes.
//!
//! # Modules
//!
//! - [`dto`] - request and response bodies
//! - [`extract`] - bounded JSON bodies and client identification
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - origin guard, CORS, rate limits, security headers, tracing
//! - [`routes`] - route table

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
