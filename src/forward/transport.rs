//! Upstream dispatch over tuned, per-scheme connection pools.
//!
//! # Responsibilities
//! - Hold one long-lived client per scheme (plain / TLS)
//! - Issue a single upstream attempt per call, bounded by the call timeout
//! - Normalize any HTTP response (1xx-5xx) into an [`UpstreamResult`]
//! - Map connection-level failures into a [`TransportError`]
//!
//! # Design Decisions
//! - Keep-alive toward the upstream is disabled (`pool_max_idle_per_host(0)`,
//!   no TCP keepalive): each logical call uses a fresh connection, so source
//!   port and TLS session cannot be correlated across calls
//! - The pool idle timeout (60s) deliberately exceeds the call timeout (30s)
//!   so call-level timeouts are never masked by socket-level teardown
//! - The TLS client pins rustls with a 1.2 floor instead of the platform
//!   default, giving a stable browser-common negotiation profile
//! - Upstream HTTP error statuses are normal results, never `Err`

use std::collections::HashMap;
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{redirect, tls, Client, Method};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// A single outbound call, fully described.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub method: Method,
    pub url: Url,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Value,
    pub timeout: Duration,
}

/// Normalized upstream response. Any HTTP status is a valid result.
#[derive(Debug, Clone)]
pub struct UpstreamResult {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
    pub duration_ms: u64,
}

/// Connection-level failure: no upstream response was obtained at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream call timed out: {0}")]
    Timeout(String),

    #[error("upstream name resolution failed: {0}")]
    Dns(String),

    #[error("upstream connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid target URL: {0}")]
    InvalidUrl(String),

    #[error("upstream transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Classify a reqwest failure into the transport taxonomy.
    ///
    /// Timeouts are flagged directly by the client; DNS and refused
    /// connections are recovered from the error source chain, where
    /// hyper-util surfaces them as an io error or a resolver message.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(err.to_string());
        }
        if err.is_builder() {
            return TransportError::InvalidUrl(err.to_string());
        }

        let mut source: Option<&(dyn StdError + 'static)> = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::ConnectionRefused => {
                        return TransportError::ConnectionRefused(err.to_string());
                    }
                    io::ErrorKind::TimedOut => {
                        return TransportError::Timeout(err.to_string());
                    }
                    _ => {}
                }
            }
            let text = cause.to_string();
            if text.contains("dns error") || text.contains("failed to lookup address") {
                return TransportError::Dns(err.to_string());
            }
            source = cause.source();
        }

        TransportError::Other(err.to_string())
    }
}

/// Pluggable dispatch seam consumed by the forwarder.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, call: UpstreamCall) -> Result<UpstreamResult, TransportError>;
}

/// Long-lived connection manager, one tuned client per scheme.
pub struct TransportPool {
    http: Client,
    https: Client,
}

impl TransportPool {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Self::build_client(config, false)?,
            https: Self::build_client(config, true)?,
        })
    }

    fn build_client(config: &UpstreamConfig, encrypted: bool) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .tcp_keepalive(None::<Duration>)
            .redirect(redirect::Policy::limited(config.max_redirects));

        if encrypted {
            builder = builder
                .use_rustls_tls()
                .min_tls_version(tls::Version::TLS_1_2);
        }

        builder.build()
    }

    fn client_for(&self, url: &Url) -> &Client {
        if url.scheme() == "https" {
            &self.https
        } else {
            &self.http
        }
    }
}

#[async_trait]
impl Transport for TransportPool {
    async fn dispatch(&self, call: UpstreamCall) -> Result<UpstreamResult, TransportError> {
        let started = Instant::now();

        let mut request = self
            .client_for(&call.url)
            .request(call.method, call.url)
            .timeout(call.timeout);

        for (name, value) in &call.headers {
            // The client owns encoding negotiation: a manually-set
            // accept-encoding would disable transparent decompression.
            if name.as_str() == "accept-encoding" {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if !call.body.is_null() {
            request = request.json(&call.body);
        }

        let response = request.send().await.map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let mut headers = HashMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_string(), text.to_string());
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });

        Ok(UpstreamResult {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_builds_with_defaults() {
        let pool = TransportPool::new(&UpstreamConfig::default());
        assert!(pool.is_ok());
    }

    #[test]
    fn test_client_selected_by_scheme() {
        let pool = TransportPool::new(&UpstreamConfig::default()).unwrap();

        let plain = Url::parse("http://example.com/").unwrap();
        let encrypted = Url::parse("https://example.com/").unwrap();

        assert!(std::ptr::eq(pool.client_for(&plain), &pool.http));
        assert!(std::ptr::eq(pool.client_for(&encrypted), &pool.https));
    }
}
