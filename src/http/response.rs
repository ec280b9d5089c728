//! Maintenance response rendering.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::negotiate::NegotiationResult;

impl IntoResponse for NegotiationResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        (status, [(header::CONTENT_TYPE, self.media_type)], self.body).into_response()
    }
}
