//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Build the Axum router: proxied prefix routes plus the liveness probe
//! - Wire up middleware (request ID, tracing)
//! - Drive the per-request pipeline: policy → buffer → transform →
//!   forward → relay, with the failure path synthesizing 502s
//!
//! # Design Decisions
//! - State is read-only behind Arc; concurrent requests share nothing
//!   mutable and complete in no guaranteed order
//! - In-flight request count is deliberately unbounded

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::Authority, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::loader::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::cors::{preflight_response, CorsPolicy};
use crate::http::request::{read_payload, PayloadError};
use crate::proxy::{Forwarder, GatewayPipeline, PathRewriter, ProxyPipeline};

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub cors: Arc<CorsPolicy>,
    pub pipeline: Arc<dyn ProxyPipeline>,
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
    pub port: u16,
}

/// HTTP server for the CORS gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Build the server from a configuration, re-validating it so every
    /// construction path enforces the same constraints.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let authority: Authority = config.upstream.address.parse().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidUpstreamAddress(
                config.upstream.address.clone(),
            )])
        })?;
        let port = config
            .listener
            .bind_address
            .parse::<SocketAddr>()
            .map(|addr| addr.port())
            .map_err(|_| {
                ConfigError::Validation(vec![ValidationError::InvalidBindAddress(
                    config.listener.bind_address.clone(),
                )])
            })?;

        let rewriter = PathRewriter::new(config.upstream.api_prefix.clone());
        let pipeline: Arc<dyn ProxyPipeline> = Arc::new(GatewayPipeline::new(authority, rewriter));

        let state = AppState {
            cors: Arc::new(CorsPolicy::new(config.cors.allowed_origins.iter().cloned())),
            pipeline,
            forwarder: Forwarder::new(Duration::from_millis(config.timeouts.upstream_ms)),
            max_body_bytes: config.limits.max_body_bytes,
            port,
        };

        let router = Self::build_router(state, &config.upstream.api_prefix);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, prefix: &str) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(prefix, any(proxy_handler))
            .route(&format!("{prefix}/{{*rest}}"), any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Liveness reply; answered locally, never forwarded.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    port: u16,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "Proxy server is running",
        port: state.port,
    })
}

/// Main proxy handler.
/// Computes the cross-origin headers, short-circuits preflights, buffers
/// the body, then forwards and relays. Failures synthesize a 502.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let cors = state.cors.headers_for(request.headers().get(header::ORIGIN));

    tracing::info!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        "Inbound request"
    );

    if request.method() == Method::OPTIONS {
        return preflight_response(&cors);
    }

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let uri = parts.uri.clone();

    let payload = match read_payload(&parts, body, state.max_body_bytes).await {
        Ok(payload) => payload,
        Err(rejection) => return reject_payload(&request_id, rejection),
    };

    if let Some(dump) = payload.dump() {
        tracing::debug!(request_id = %request_id, body = %dump, "Request body");
    }

    let outbound = match state.pipeline.transform_request(&parts, &payload) {
        Ok(outbound) => outbound,
        Err(failure) => return state.pipeline.handle_failure(&failure, &method, &uri, &cors),
    };

    match state.forwarder.send(outbound).await {
        Ok(upstream) => state.pipeline.transform_response(upstream, &cors, &uri),
        Err(failure) => state.pipeline.handle_failure(&failure, &method, &uri, &cors),
    }
}

/// Map a body rejection to its client-facing status. Runs before any
/// forwarding is attempted.
fn reject_payload(request_id: &str, rejection: PayloadError) -> Response {
    let status = match &rejection {
        PayloadError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        PayloadError::Json(_) => StatusCode::BAD_REQUEST,
    };
    tracing::warn!(request_id = %request_id, error = %rejection, "Rejected request body");
    (status, rejection.to_string()).into_response()
}
