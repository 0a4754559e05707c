//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /s/{code}`   - Short link redirect or application markup
//! - `/api/*`           - JSON API, see [`crate::api::routes`]
//! - anything else      - Forwarded to the origin upstream
//!
//! # Middleware
//!
//! Outermost first:
//!
//! - **Tracing** - Structured request/response logging
//! - **Security headers** - Baseline set on every response, CSP on `/api/*`
//! - **CORS** - Preflight answers and response decoration for trusted origins

use axum::routing::get;
use axum::{Router, middleware};

use crate::api;
use crate::api::handlers::{passthrough_handler, redirect_handler};
use crate::api::middleware::{cors, security_headers, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::api_routes(state.clone()))
        .route(
            "/s/{code}",
            get(redirect_handler).fallback(passthrough_handler),
        )
        .fallback(passthrough_handler)
        .layer(middleware::from_fn_with_state(state.clone(), cors::layer))
        .layer(middleware::from_fn(security_headers::layer))
        .layer(tracing::layer())
        .with_state(state)
}
