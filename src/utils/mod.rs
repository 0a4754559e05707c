//! Utility functions shared across the application.
//!
//! - [`code_generator`] - Word and fallback short code generation
//! - [`url_hasher`] - Reverse-index content hashing
//! - [`app_url`] - Same-origin URL validation
//! - [`retry`] - Bounded retry for store calls

pub mod app_url;
pub mod code_generator;
pub mod retry;
pub mod url_hasher;
