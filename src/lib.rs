//! Maintenance-mode gate for a reverse proxy.
//!
//! Every request is either passed upstream or answered with a 503
//! maintenance notice, depending on a hot-reloadable enabled flag and an
//! optional `onlyIf` predicate over the request's host, path, method and
//! user agent. Intercepted requests get the configured body that best
//! matches their `Accept` header.

// Decision engine
pub mod filter;
pub mod gate;
pub mod negotiate;

// Host surface
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use gate::{decide, Decision, Snapshot, SnapshotStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
