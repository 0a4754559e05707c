//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod passthrough;
pub mod redirect;
pub mod resolve;
pub mod shorten;
pub mod telemetry;

pub use passthrough::passthrough_handler;
pub use redirect::redirect_handler;
pub use resolve::resolve_handler;
pub use shorten::{create_link_handler, update_link_handler, usage_handler};
pub use telemetry::{delete_telemetry_handler, get_telemetry_handler, post_telemetry_handler};
