//! API route configuration.
//!
//! State-changing endpoints sit behind [`crate::api::middleware::guard`],
//! which checks the caller's origin and rate-limit bucket. Methods a route
//! does not handle fall through to the origin upstream.

use axum::{Router, middleware, routing::get};

use crate::api::handlers::{
    create_link_handler, delete_telemetry_handler, get_telemetry_handler, passthrough_handler,
    post_telemetry_handler, resolve_handler, update_link_handler, usage_handler,
};
use crate::api::middleware::guard;
use crate::state::AppState;

/// All API routes.
///
/// # Endpoints
///
/// - `GET    /api/shorten`          - Usage document
/// - `POST   /api/shorten`          - Create a short link (guarded, `create` bucket)
/// - `PUT    /api/shorten`          - Repoint a short link (guarded, `update` bucket)
/// - `GET    /api/resolve/{code}`   - Resolve a code without redirecting
/// - `POST   /api/telemetry`        - Merge counter deltas (guarded, `telemetry` bucket)
/// - `GET    /api/telemetry`        - Read the aggregate (guarded, no bucket)
/// - `DELETE /api/telemetry`        - Reset the aggregate (admin token)
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/shorten",
            get(usage_handler)
                .post(create_link_handler)
                .put(update_link_handler)
                .fallback(passthrough_handler),
        )
        .route(
            "/api/resolve/{code}",
            get(resolve_handler).fallback(passthrough_handler),
        )
        .route(
            "/api/telemetry",
            get(get_telemetry_handler)
                .post(post_telemetry_handler)
                .delete(delete_telemetry_handler)
                .fallback(passthrough_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, guard::layer))
}
