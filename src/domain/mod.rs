//! Domain layer: link layout, short code shapes and telemetry counters.
//!
//! Nothing here performs I/O. Services in [`crate::application`] combine these
//! types with the stores in [`crate::infrastructure`].

pub mod link;
pub mod short_code;
pub mod telemetry;
