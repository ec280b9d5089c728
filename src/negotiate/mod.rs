//! Content negotiation over the configured maintenance bodies.
//!
//! # Data Flow
//! ```text
//! Accept header (optional)
//!     → accept.rs (media ranges with q-values)
//!     → negotiator.rs (score each alternative, pick best)
//!     → NegotiationResult (media type, body, 503)
//! ```
//!
//! # Design Decisions
//! - Ties resolve to configuration order, never header order
//! - Configured content is never replaced by the default notice

pub mod accept;
pub mod media;
pub mod negotiator;

pub use accept::{Accept, MediaRange};
pub use media::media_type_for;
pub use negotiator::{
    negotiate, ContentAlternative, NegotiationResult, DEFAULT_BODY, MAINTENANCE_STATUS,
};
