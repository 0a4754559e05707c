//! # Share Links
//!
//! Short, shareable links for application-state URLs, plus an anonymous
//! usage-counter aggregator, served by Axum in front of the application.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Short code shapes, link record layout, telemetry rules
//! - **Application Layer** ([`application`]) - Link, telemetry and admin-token services
//! - **Infrastructure Layer** ([`infrastructure`]) - Key-value stores, edge cache, origin client
//! - **API Layer** ([`api`]) - Handlers, DTOs, and middleware (CORS, guard, rate limits)
//!
//! ## Features
//!
//! - Three-word short codes with collision probing and hex fallback
//! - Deduplication through a SHA-256 reverse index
//! - Edge-cached redirects, evicted on update
//! - Browser navigations served the application markup with the target embedded
//! - Sanitized, capped usage counters in a single aggregate
//! - Per-client fixed-window rate limits and same-origin checks
//!
//! ## Quick Start
//!
//! ```bash
//! export APP_ORIGIN="https://app.example"
//! export LINKS_STORE_URL="redis://localhost:6379/0"
//! export TELEMETRY_STORE_URL="redis://localhost:6379/1"
//! export ORIGIN_UPSTREAM_URL="http://localhost:5173"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for the admin CLI
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AuthService, LinkService, TelemetryService};
    pub use crate::domain::short_code::{CodeShape, ShortCode};
    pub use crate::domain::telemetry::TelemetryAggregate;
    pub use crate::error::AppError;
    pub use crate::state::{AppState, Backends};
}
