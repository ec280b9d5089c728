//! Per-request maintenance decision.

use crate::filter::RequestAttributes;
use crate::gate::snapshot::Snapshot;
use crate::negotiate::{negotiate, NegotiationResult};

/// Outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward upstream unchanged.
    PassThrough,
    /// Answer with the maintenance response.
    Intercept(NegotiationResult),
}

impl Decision {
    pub fn is_intercept(&self) -> bool {
        matches!(self, Decision::Intercept(_))
    }
}

/// Decide whether `attrs` is intercepted under `snapshot`.
///
/// Total: every failure mode was ruled out when the snapshot was built.
pub fn decide(snapshot: &Snapshot, attrs: &RequestAttributes<'_>, accept: Option<&str>) -> Decision {
    if !snapshot.enabled() {
        return Decision::PassThrough;
    }

    let matches = snapshot
        .predicate()
        .map_or(true, |predicate| predicate.evaluate(attrs));
    if !matches {
        return Decision::PassThrough;
    }

    Decision::Intercept(negotiate(accept, snapshot.alternatives()))
}
