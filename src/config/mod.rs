//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or JSON from a provider)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → http server rebuilds the maintenance snapshot
//!     → atomic swap, or keep the previous snapshot on error
//! ```
//!
//! # Design Decisions
//! - A loaded `GateConfig` is never mutated; reloads produce a new one
//! - Every field has a default, so a file may hold only `[maintenance]`
//! - Serde handles shape, `validation.rs` handles meaning
//! - Predicate and content errors surface when the snapshot is built

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    GateConfig, ListenerConfig, MaintenanceConfig, ObservabilityConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
