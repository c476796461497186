//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forwarder / server produce:
//!     → tracing events (request-id-tagged structured logs)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod metrics;
