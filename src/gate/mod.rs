//! Maintenance decision engine.
//!
//! # Data Flow
//! ```text
//! Configuration update (out of band):
//!     MaintenanceConfig
//!     → resolver.rs (content references → bytes)
//!     → snapshot.rs (parse predicate, infer media types)
//!     → store.rs (atomic swap; rejected updates change nothing)
//!
//! Per request:
//!     store.rs (load current snapshot, lock-free)
//!     → decision.rs (enabled? predicate? → negotiate)
//!     → PassThrough | Intercept(NegotiationResult)
//! ```
//!
//! # Design Decisions
//! - All fallibility lives in snapshot construction
//! - No I/O on the request path; bodies are loaded up front
//! - A snapshot is never mutated, only replaced

pub mod decision;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use decision::{decide, Decision};
pub use resolver::{ContentResolver, FsResolver, MemoryResolver};
pub use snapshot::{ContentItem, Snapshot};
pub use store::SnapshotStore;
