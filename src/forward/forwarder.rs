//! Forwarding orchestration.
//!
//! Per-call state machine:
//! `Received → Authenticated → Validated → Dispatching → {Succeeded, Failed}`.
//! Terminal states are final; there is no retry transition. The secret check
//! runs before everything else so a bad secret never triggers URL parsing,
//! header work, or upstream contact.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ProxyConfig;
use crate::forward::envelope::{classify, ResponseEnvelope};
use crate::forward::sanitizer::sanitize;
use crate::forward::transport::{Transport, UpstreamCall};
use crate::observability::metrics;

/// Inbound call description, decoded from the `/proxy` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyRequest {
    #[serde(rename = "targetUrl", default)]
    pub target_url: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub params: HashMap<String, String>,

    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub secret: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Orchestrates a single forwarding call end to end.
pub struct Forwarder {
    config: Arc<ProxyConfig>,
    transport: Arc<dyn Transport>,
}

impl Forwarder {
    pub fn new(config: Arc<ProxyConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Run one call through the state machine and produce its envelope.
    pub async fn handle(&self, request: ProxyRequest, request_id: &str) -> ResponseEnvelope {
        let started = Instant::now();

        // Received → Authenticated
        if request.secret != self.config.security.shared_secret {
            tracing::warn!(request_id = %request_id, "Rejected call with invalid secret");
            metrics::record_request(&request.method, 403, "auth_failed", started);
            return ResponseEnvelope::auth_failure(request_id);
        }

        // Authenticated → Validated
        if request.target_url.trim().is_empty() {
            tracing::warn!(request_id = %request_id, "Rejected call without target URL");
            metrics::record_request(&request.method, 400, "invalid", started);
            return ResponseEnvelope::validation_failure(
                request_id,
                "Target URL required",
                "Missing targetUrl in request body.",
            );
        }

        let method = match Method::from_bytes(request.method.trim().to_uppercase().as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %request.method,
                    "Rejected call with unsupported method"
                );
                metrics::record_request(&request.method, 400, "invalid", started);
                return ResponseEnvelope::validation_failure(
                    request_id,
                    "Unsupported HTTP method",
                    &format!("'{}' is not a valid HTTP method.", request.method),
                );
            }
        };

        // An unparseable URL is a transport-class failure: it surfaces as a
        // 502 like any other reason the upstream could not be reached.
        let url = match Url::parse(&request.target_url) {
            Ok(u) => u,
            Err(e) => {
                let err = crate::forward::transport::TransportError::InvalidUrl(e.to_string());
                tracing::error!(
                    request_id = %request_id,
                    target = %request.target_url,
                    error = %err,
                    "Target URL rejected"
                );
                metrics::record_request(method.as_str(), 502, "transport_error", started);
                return ResponseEnvelope::from_failure(request_id, classify(&err));
            }
        };

        // Validated → Dispatching
        let call = UpstreamCall {
            method: method.clone(),
            url,
            headers: sanitize(&request.headers),
            query: request.params.clone(),
            body: request.data.clone(),
            timeout: Duration::from_secs(self.config.upstream.request_timeout_secs),
        };

        match self.transport.dispatch(call).await {
            // Dispatching → Succeeded
            Ok(result) => {
                tracing::info!(
                    request_id = %request_id,
                    target = %request.target_url,
                    status = result.status,
                    duration_ms = result.duration_ms,
                    "Upstream call completed"
                );
                metrics::record_request(method.as_str(), result.status, "forwarded", started);
                ResponseEnvelope::from_upstream(request_id, &request.target_url, result)
            }
            // Dispatching → Failed
            Err(err) => {
                let classification = classify(&err);
                tracing::error!(
                    request_id = %request_id,
                    target = %request.target_url,
                    error = %err,
                    error_type = %classification.error_type,
                    "Upstream call failed"
                );
                metrics::record_request(
                    method.as_str(),
                    classification.http_status,
                    "transport_error",
                    started,
                );
                ResponseEnvelope::from_failure(request_id, classification)
            }
        }
    }
}
