//! Request inspection.
//!
//! # Responsibilities
//! - Extract the predicate-visible attributes (host, path, method, ua)
//! - Extract the `Accept` header for negotiation
//!
//! # Design Decisions
//! - Attributes borrow from the request and its parsed authority
//! - `http.path` is the path with its query string
//! - A `Host` header that is not a valid authority reads as empty
//! - Repeated headers: the first value is used
//! - Non-UTF-8 header values read as empty

use std::str::FromStr;

use axum::http::{header, uri::Authority, HeaderMap, Request};

use crate::filter::RequestAttributes;

/// The authority a request is addressed to: its `Host` header, or the URI
/// authority when there is no header. `None` if the header is not a valid
/// authority.
pub fn request_authority<B>(request: &Request<B>) -> Option<Authority> {
    match request.headers().get(header::HOST) {
        Some(value) => value.to_str().ok().and_then(|v| Authority::from_str(v).ok()),
        None => request.uri().authority().cloned(),
    }
}

/// Predicate attributes of `request`. `authority` comes from
/// [`request_authority`]; only its host part is visible.
pub fn request_attributes<'a, B>(
    request: &'a Request<B>,
    authority: Option<&'a Authority>,
) -> RequestAttributes<'a> {
    RequestAttributes {
        host: authority.map_or("", Authority::host),
        path: request
            .uri()
            .path_and_query()
            .map_or("/", |path_and_query| path_and_query.as_str()),
        method: request.method().as_str(),
        user_agent: first_header(request.headers(), header::USER_AGENT).unwrap_or(""),
    }
}

/// The `Accept` header, if present.
pub fn accept_header<B>(request: &Request<B>) -> Option<&str> {
    first_header(request.headers(), header::ACCEPT)
}

fn first_header(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
