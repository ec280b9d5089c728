//! `onlyIf` predicate language.
//!
//! # Data Flow
//! ```text
//! predicate source (config)
//!     → parser.rs (tokens → Expr, regexes compiled once)
//!     → ast.rs (immutable Expr owned by the snapshot)
//!
//! Per request:
//!     RequestAttributes (host, path, method, ua)
//!     → eval.rs (walk Expr → bool)
//! ```
//!
//! # Design Decisions
//! - Only four fields and four comparison operators exist
//! - Every failure happens at parse time; evaluation cannot fail
//! - Regex matching uses the `regex` crate (linear time, no backtracking)

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{Expr, Field, Pattern, StringSet};
pub use eval::{evaluate, RequestAttributes};
pub use parser::{parse, SyntaxError, SyntaxErrorKind};
