//! Request identification helpers.
//!
//! Request IDs are generated by the `tower-http` request-id layer as early
//! as possible so every log line and envelope for a call carries the same
//! identifier.

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the per-call identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 for every inbound call.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Extract the request id set by the middleware layer.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extracts_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[test]
    fn test_missing_request_id() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_generated_ids_are_unique_header_values() {
        let mut maker = UuidRequestId;
        let request = Request::builder().body(()).unwrap();

        let first = maker.make_request_id(&request).unwrap();
        let second = maker.make_request_id(&request).unwrap();
        assert_ne!(first.header_value(), second.header_value());
    }
}
