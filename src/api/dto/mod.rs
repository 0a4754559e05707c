//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs use Serde for deserialization and validator for field
//! bounds; deeper checks live in the services.

pub mod resolve;
pub mod shorten;
pub mod telemetry;
