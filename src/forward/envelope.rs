//! Response envelope construction and failure classification.
//!
//! Every outcome of a forwarding call, success or failure, is rendered into
//! the single outward JSON shape the caller observes. `success` is true iff
//! an upstream response was obtained at all; upstream 4xx/5xx statuses are
//! successful proxy outcomes.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::forward::transport::{TransportError, UpstreamResult};

/// Transport-framing headers stripped from pass-through: the body has
/// already been decoded, so forwarding them would mislead the caller.
const FRAMING_HEADERS: [&str; 2] = ["content-encoding", "transfer-encoding"];

/// Failure category for transport-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorType {
    Timeout,
    DnsFailure,
    ConnectionRefused,
    GenericProxyError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorType::Timeout => "Timeout",
            ErrorType::DnsFailure => "DnsFailure",
            ErrorType::ConnectionRefused => "ConnectionRefused",
            ErrorType::GenericProxyError => "GenericProxyError",
        };
        f.write_str(name)
    }
}

/// Deterministic mapping from a transport failure to the outward status,
/// category, and diagnostic code.
#[derive(Debug, Clone)]
pub struct FailureClassification {
    pub http_status: u16,
    pub error_type: ErrorType,
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

/// Classify a transport-level failure.
pub fn classify(err: &TransportError) -> FailureClassification {
    let (http_status, error_type, code) = match err {
        TransportError::Timeout(_) => (504, ErrorType::Timeout, "ETIMEDOUT"),
        TransportError::Dns(_) => (502, ErrorType::DnsFailure, "ENOTFOUND"),
        TransportError::ConnectionRefused(_) => {
            (502, ErrorType::ConnectionRefused, "ECONNREFUSED")
        }
        TransportError::InvalidUrl(_) | TransportError::Other(_) => {
            (502, ErrorType::GenericProxyError, "UNKNOWN_ERROR")
        }
    };

    FailureClassification {
        http_status,
        error_type,
        code: code.to_string(),
        message: err.to_string(),
        details: None,
    }
}

/// Per-call metadata surfaced to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    #[serde(rename = "requestId")]
    pub request_id: String,

    #[serde(rename = "durationMs", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// The single outward JSON shape for every forwarding outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub status: u16,
    pub meta: Meta,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(rename = "statusText", skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ResponseEnvelope {
    fn base(success: bool, status: u16, request_id: &str) -> Self {
        Self {
            success,
            status,
            meta: Meta {
                request_id: request_id.to_string(),
                duration_ms: None,
                target: None,
            },
            error: None,
            message: None,
            code: None,
            status_text: None,
            data: None,
            headers: None,
            details: None,
        }
    }

    /// Secret mismatch: rejected before any upstream contact.
    pub fn auth_failure(request_id: &str) -> Self {
        let mut envelope = Self::base(false, 403, request_id);
        envelope.error = Some("Invalid Secret".to_string());
        envelope.message = Some("Authentication failed. Invalid Secret Key.".to_string());
        envelope
    }

    /// Request rejected before dispatch (missing URL, bad method, bad body).
    pub fn validation_failure(request_id: &str, error: &str, message: &str) -> Self {
        let mut envelope = Self::base(false, 400, request_id);
        envelope.error = Some(error.to_string());
        envelope.message = Some(message.to_string());
        envelope
    }

    /// An upstream response was obtained; its status passes through exactly.
    pub fn from_upstream(request_id: &str, target: &str, result: UpstreamResult) -> Self {
        let mut headers = result.headers;
        for framing in FRAMING_HEADERS {
            headers.remove(framing);
        }

        let mut envelope = Self::base(true, result.status, request_id);
        envelope.meta.duration_ms = Some(result.duration_ms);
        envelope.meta.target = Some(target.to_string());
        envelope.status_text = Some(result.status_text);
        envelope.data = Some(result.body);
        envelope.headers = Some(headers);
        envelope
    }

    /// A transport-level failure: no upstream response at all.
    pub fn from_failure(request_id: &str, classification: FailureClassification) -> Self {
        let mut envelope = Self::base(false, classification.http_status, request_id);
        envelope.error = Some(classification.error_type.to_string());
        envelope.message = Some(classification.message);
        envelope.code = Some(classification.code);
        envelope.details = classification.details;
        envelope
    }

    /// Unexpected fault caught at the outermost boundary.
    pub fn internal_fault(request_id: &str) -> Self {
        let mut envelope = Self::base(false, 500, request_id);
        envelope.error = Some("Internal Proxy Error".to_string());
        envelope.message = Some("An unexpected fault occurred inside the proxy.".to_string());
        envelope
    }
}
