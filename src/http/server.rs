//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the maintenance gate in front
//! - Wire up middleware (tracing, request ID, timeout)
//! - Forward passed-through requests to the upstream
//! - Apply configuration updates to the gate while serving

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, GateConfig, ValidationError};
use crate::gate::{FsResolver, Snapshot, SnapshotStore};
use crate::http::middleware::maintenance_middleware;
use crate::lifecycle::shutdown::ShutdownListener;

/// Application state injected into the upstream handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server for the gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    gate: Arc<SnapshotStore>,
}

impl HttpServer {
    /// Create a new HTTP server. Fails if the initial maintenance settings
    /// do not build.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        let upstream: Authority = config.upstream.address.parse().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidAddress {
                field: "upstream.address",
                value: config.upstream.address.clone(),
            }])
        })?;

        let snapshot = Snapshot::from_config(&config.maintenance, &resolver_for(&config))?;
        let gate = Arc::new(SnapshotStore::new(snapshot));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState { client, upstream };
        let router = Self::build_router(&config, state, gate.clone());

        Ok(Self {
            router,
            config,
            gate,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GateConfig, state: AppState, gate: Arc<SnapshotStore>) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, maintenance_middleware))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires, applying configuration
    /// updates from `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let gate = self.gate.clone();
        let running = self.config.clone();
        let reloader = tokio::spawn(async move {
            while let Some(update) = config_updates.recv().await {
                apply_update(&gate, &running, &update);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The gate's snapshot store.
    pub fn gate(&self) -> Arc<SnapshotStore> {
        self.gate.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

fn resolver_for(config: &GateConfig) -> FsResolver {
    FsResolver::new(
        config
            .maintenance
            .content_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    )
}

/// Rebuild the gate from a reloaded configuration. Only the maintenance
/// section takes effect without a restart.
fn apply_update(gate: &SnapshotStore, running: &GateConfig, update: &GateConfig) {
    if update.listener != running.listener || update.upstream != running.upstream {
        tracing::warn!("Listener and upstream changes take effect after a restart");
    }

    if gate.reload(&update.maintenance, &resolver_for(update)).is_ok() {
        tracing::info!(
            enabled = update.maintenance.enabled,
            "Maintenance configuration applied"
        );
    }
}

/// Forward a request to the upstream unchanged.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.version = Version::HTTP_11;

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(error = %e, upstream = %state.upstream, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
