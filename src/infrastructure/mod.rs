//! Infrastructure layer: storage backends and external services.
//!
//! - [`kv`] - key-value stores holding links and telemetry
//! - [`cache`] - edge cache for resolved redirects
//! - [`origin`] - client for the origin upstream serving the application

pub mod cache;
pub mod kv;
pub mod origin;
