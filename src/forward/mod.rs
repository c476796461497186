//! Request-forwarding core.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (decoded JSON)
//!     → forwarder.rs (auth check → URL check → state machine)
//!     → sanitizer.rs (strip relay-disclosure headers, inject identity)
//!     → transport.rs (single upstream attempt, tuned per-scheme pools)
//!     → envelope.rs (uniform JSON envelope, failure classification)
//! ```
//!
//! # Design Decisions
//! - The forwarder is a pure pipeline over a pluggable [`Transport`] seam,
//!   so tests can count and script dispatches
//! - Upstream HTTP error statuses are successful outcomes; only
//!   connection-level failures classify as errors

pub mod envelope;
pub mod forwarder;
pub mod sanitizer;
pub mod transport;

pub use envelope::{ErrorType, FailureClassification, ResponseEnvelope};
pub use forwarder::{Forwarder, ProxyRequest};
pub use sanitizer::{sanitize, BANNED_HEADERS};
pub use transport::{Transport, TransportError, TransportPool, UpstreamCall, UpstreamResult};
