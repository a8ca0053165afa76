//! HTTP API Layer
//!
//! Operator-facing surface of the boot panel: the embedded page plus one
//! JSON endpoint per orchestrated action.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use server::{create_router, HttpServer, HttpServerConfig};
pub use types::ApiResponse;
