//! HTTP API: router assembly, handlers, and error mapping.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::build_router;
pub use server::start_api_server;
