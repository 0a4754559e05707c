//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod telemetry_service;

pub use auth_service::AuthService;
pub use link_service::LinkService;
pub use telemetry_service::TelemetryService;
