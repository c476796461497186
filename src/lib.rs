//! Stealth HTTP Forwarding Proxy
//!
//! A single-endpoint forwarding proxy built with Tokio and Axum. A caller
//! POSTs a JSON description of an outbound request; the proxy authenticates
//! it, sanitizes the headers, relays the call upstream over a tuned
//! connection pool, and returns the upstream outcome in a uniform JSON
//! envelope.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │               FORWARDING PROXY                │
//!   POST /proxy      │  ┌────────┐   ┌───────────────────────────┐   │
//!   ─────────────────┼─▶│  http  │──▶│         forward           │   │
//!                    │  │ server │   │ forwarder → sanitizer     │   │
//!                    │  └────────┘   │           → transport ────┼───┼──▶ Upstream
//!                    │               │           → envelope      │   │
//!   JSON envelope    │  ┌────────┐   └───────────────────────────┘   │
//!   ◀────────────────┼──│envelope│◀──────────────┘                   │
//!                    │  └────────┘                                   │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │    config        observability          │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod forward;
pub mod http;

// Cross-cutting concerns
pub mod observability;

pub use config::ProxyConfig;
pub use forward::{Forwarder, ProxyRequest, ResponseEnvelope, Transport, TransportPool};
pub use http::HttpServer;
