//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, PROXY_SECRET, ...)
//!     → loader.rs (read once at startup)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to server and forwarder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults so the proxy runs unconfigured

pub mod loader;
pub mod schema;

pub use loader::{load_from_env, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ProxyConfig, SecurityConfig, UpstreamConfig};
