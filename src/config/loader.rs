//! Configuration loading from the environment.
//!
//! The configuration surface is deliberately small and read exactly once at
//! process start: `PORT`, `PROXY_SECRET`, an optional upstream timeout
//! override, and optional metrics exposition.

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidTimeout(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort(v) => write!(f, "PORT is not a valid port number: {}", v),
            ConfigError::InvalidTimeout(v) => {
                write!(f, "FORWARD_TIMEOUT_SECS is not a valid duration: {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Build the configuration from environment variables over the defaults.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();

    if let Ok(port) = std::env::var("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Ok(secret) = std::env::var("PROXY_SECRET") {
        if !secret.is_empty() {
            config.security.shared_secret = secret;
        }
    }

    if let Ok(timeout) = std::env::var("FORWARD_TIMEOUT_SECS") {
        let secs: u64 = timeout
            .parse()
            .ok()
            .filter(|s| *s > 0)
            .ok_or(ConfigError::InvalidTimeout(timeout))?;
        config.upstream.request_timeout_secs = secs;
    }

    if let Ok(addr) = std::env::var("METRICS_ADDR") {
        if !addr.is_empty() {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.security.shared_secret, "n8n-default-secret");
        assert_eq!(config.upstream.request_timeout_secs, 30);
        assert!(config.upstream.request_timeout_secs < config.upstream.idle_timeout_secs);
        assert!(!config.observability.metrics_enabled);
    }
}
