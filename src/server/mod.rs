//! HTTP server
//!
//! - `builder`: wires configuration, store, upstream client and sink
//! - `host`: state shared by the handlers
//! - `handlers` / `router`: the read endpoints and health checks

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::{ServerBuilder, shutdown_signal};
pub use handlers::{ApiError, ErrorResponse};
pub use host::ServerHost;
pub use router::build_routes;
