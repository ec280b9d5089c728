//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, request ID, timeout)
//!     → middleware/maintenance.rs (gate decision)
//!         → intercept: response.rs (503 + negotiated body)
//!         → pass: server.rs proxy handler → upstream
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::maintenance_middleware;
pub use request::{accept_header, request_attributes, request_authority};
pub use server::HttpServer;
