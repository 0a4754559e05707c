//! Application layer services implementing business logic.
//!
//! Services coordinate the key-value stores, validation and domain rules, and
//! give HTTP handlers and the admin CLI one API to call.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, update and resolution
//! - [`services::telemetry_service::TelemetryService`] - Usage counter aggregation
//! - [`services::auth_service::AuthService`] - Admin token checks for telemetry resets

pub mod services;
