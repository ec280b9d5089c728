//! `Accept` header parsing.
//!
//! # Design Decisions
//! - Header syntax (quoting, parameters, list splitting) is left to
//!   `headers-accept`; this module only reads type, subtype and `q`
//! - Media ranges compare case-insensitively
//! - A header that does not parse accepts nothing, so every alternative
//!   scores 0
//! - A missing or blank header means `*/*;q=1`

use std::str::FromStr;

use headers_accept::Accept as AcceptHeader;
use mediatype::{MediaType, MediaTypeBuf, ReadParams};

const WILDCARD: &str = "*";

/// One media range from an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    /// Lowercased type, `*` for a wildcard.
    pub kind: String,
    /// Lowercased subtype, `*` for a wildcard.
    pub subtype: String,
    /// Weight in `[0, 1]`.
    pub q: f32,
}

impl MediaRange {
    fn any() -> Self {
        Self {
            kind: WILDCARD.to_string(),
            subtype: WILDCARD.to_string(),
            q: 1.0,
        }
    }

    /// Read type, subtype and weight from a parsed media range. `None` when
    /// the `q` parameter is not a number.
    fn from_media_type(media_type: &MediaTypeBuf) -> Option<Self> {
        let mut q = 1.0_f32;
        for (name, value) in media_type.params() {
            if name.as_str().eq_ignore_ascii_case("q") {
                q = value.as_str().trim_matches('"').parse::<f32>().ok()?;
            }
        }
        if !q.is_finite() {
            return None;
        }

        Some(Self {
            kind: media_type.ty().as_str().to_ascii_lowercase(),
            subtype: media_type.subty().as_str().to_ascii_lowercase(),
            q: q.clamp(0.0, 1.0),
        })
    }

    /// True if this range covers `media_type` (`type/subtype`).
    pub fn matches(&self, media_type: &str) -> bool {
        let Ok(media_type) = MediaType::parse(media_type) else {
            return false;
        };

        if self.kind == WILDCARD {
            return true;
        }
        if !self.kind.eq_ignore_ascii_case(media_type.ty.as_str()) {
            return false;
        }
        self.subtype == WILDCARD || self.subtype.eq_ignore_ascii_case(media_type.subty.as_str())
    }
}

/// Parsed `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct Accept {
    ranges: Vec<MediaRange>,
}

impl Accept {
    /// Parse a header value; `None` or a blank value accepts anything.
    pub fn parse(header: Option<&str>) -> Self {
        let header = match header.map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Self {
                    ranges: vec![MediaRange::any()],
                }
            }
        };

        let ranges = match AcceptHeader::from_str(header) {
            Ok(accept) => accept
                .media_types()
                .filter_map(MediaRange::from_media_type)
                .collect(),
            Err(e) => {
                tracing::debug!(accept = header, error = %e, "Unparseable Accept header");
                Vec::new()
            }
        };
        Self { ranges }
    }

    pub fn ranges(&self) -> &[MediaRange] {
        &self.ranges
    }

    /// Highest `q` among ranges covering `media_type`, or 0.
    pub fn score(&self, media_type: &str) -> f32 {
        self.ranges
            .iter()
            .filter(|range| range.matches(media_type))
            .map(|range| range.q)
            .fold(0.0, f32::max)
    }
}
