//! Maintenance middleware.
//! Intercepts requests while maintenance mode applies to them.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gate::{Decision, SnapshotStore};
use crate::http::request::{accept_header, request_attributes, request_authority};
use crate::observability::metrics;

pub async fn maintenance_middleware(
    State(gate): State<Arc<SnapshotStore>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authority = request_authority(&request);
    let decision = gate.decide(
        &request_attributes(&request, authority.as_ref()),
        accept_header(&request),
    );

    match decision {
        Decision::PassThrough => {
            metrics::record_decision("pass");
            next.run(request).await
        }
        Decision::Intercept(result) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                media_type = result.media_type,
                "Request intercepted by maintenance mode"
            );
            metrics::record_decision("intercept");
            result.into_response()
        }
    }
}
