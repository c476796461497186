//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy handlers
//! - Wire up middleware (request ID, body limit, tracing, panic boundary)
//! - Decode the inbound JSON description and hand it to the forwarder
//! - Write the envelope back with its own status as the HTTP status
//!
//! # Design Decisions
//! - The caller always receives the JSON envelope: malformed bodies and
//!   handler panics are converted instead of falling back to plain text
//! - Body decoding happens from raw bytes so a rejected payload still
//!   produces a 400 envelope rather than Axum's default rejection

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::forward::{Forwarder, ProxyRequest, ResponseEnvelope, TransportPool};
use crate::http::request::{request_id, UuidRequestId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let config = Arc::new(config);

        let pool = TransportPool::new(&config.upstream)?;
        let forwarder = Arc::new(Forwarder::new(config.clone(), Arc::new(pool)));

        let state = AppState {
            config: config.clone(),
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/proxy", post(proxy_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(CatchPanicLayer::custom(handle_panic))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Liveness probe; no forwarding logic involved.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "message": "Proxy is healthy and ready.",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Decode the call description and run it through the forwarder.
async fn proxy_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let request_id = request_id(&headers);

    let request: ProxyRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected malformed JSON body");
            return envelope_response(ResponseEnvelope::validation_failure(
                &request_id,
                "Malformed JSON body",
                &e.to_string(),
            ));
        }
    };

    envelope_response(state.forwarder.handle(request, &request_id).await)
}

/// Write the envelope with its own status field as the HTTP status.
fn envelope_response(envelope: ResponseEnvelope) -> axum::response::Response {
    let status =
        StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

/// Outermost fault boundary: a panicking handler still yields an envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(error = %detail, "Handler panicked");

    let body = serde_json::to_vec(&ResponseEnvelope::internal_fault("unknown"))
        .unwrap_or_else(|_| b"{\"success\":false,\"status\":500}".to_vec());

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
