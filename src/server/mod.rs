//! HTTP server: shared state, handlers, routes and the builder that wires them

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::AppState;
pub use router::build_api_routes;
