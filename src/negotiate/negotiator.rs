//! Selection of the maintenance body for a request.

use bytes::Bytes;

use crate::negotiate::accept::Accept;
use crate::negotiate::media::TEXT_PLAIN;

/// Status code of every maintenance response.
pub const MAINTENANCE_STATUS: u16 = 503;

/// Body served when no content is configured.
pub const DEFAULT_BODY: &str = "Service unavailable due to maintenance";

/// A configured response body and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAlternative {
    pub media_type: &'static str,
    pub body: Bytes,
}

impl ContentAlternative {
    pub fn new(media_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            media_type,
            body: body.into(),
        }
    }
}

/// The response chosen for an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationResult {
    pub media_type: &'static str,
    pub body: Bytes,
    pub status: u16,
}

impl NegotiationResult {
    /// The plain-text notice used when no content is configured.
    pub fn fallback() -> Self {
        Self {
            media_type: TEXT_PLAIN,
            body: Bytes::from_static(DEFAULT_BODY.as_bytes()),
            status: MAINTENANCE_STATUS,
        }
    }
}

impl From<&ContentAlternative> for NegotiationResult {
    fn from(alternative: &ContentAlternative) -> Self {
        Self {
            media_type: alternative.media_type,
            body: alternative.body.clone(),
            status: MAINTENANCE_STATUS,
        }
    }
}

/// Pick the alternative the client prefers.
///
/// The highest `q` wins and ties go to the earliest alternative. When the
/// header rules out every alternative the first one is still served; the
/// default notice only appears when nothing is configured.
pub fn negotiate(accept: Option<&str>, alternatives: &[ContentAlternative]) -> NegotiationResult {
    let Some(first) = alternatives.first() else {
        return NegotiationResult::fallback();
    };

    let accept = Accept::parse(accept);
    let mut best = first;
    let mut best_score = accept.score(first.media_type);

    for alternative in &alternatives[1..] {
        let score = accept.score(alternative.media_type);
        if score > best_score {
            best = alternative;
            best_score = score;
        }
    }

    NegotiationResult::from(best)
}
