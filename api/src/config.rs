//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::{QueryConfig, DEFAULT_MAX_RESULT_ROWS};
use std::net::SocketAddr;

/// Default request body ceiling: 32 MiB, enough for a full course dataset.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `INSIGHT_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `INSIGHT_PORT`: The port to listen on (default: 8080)
/// - `INSIGHT_MAX_RESULT_ROWS`: Row ceiling for query results (default: 5000)
/// - `INSIGHT_BODY_LIMIT_BYTES`: Maximum request body size (default: 32 MiB)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Row ceiling for query results.
    pub max_result_rows: usize,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `INSIGHT_PORT` is set but cannot be parsed as a valid port number
    /// - `INSIGHT_MAX_RESULT_ROWS` or `INSIGHT_BODY_LIMIT_BYTES` is set but is not a number
    /// - `INSIGHT_MAX_RESULT_ROWS` is zero
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("INSIGHT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("INSIGHT_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("INSIGHT_PORT must be a valid port number")?
            .unwrap_or(8080);

        let max_result_rows = std::env::var("INSIGHT_MAX_RESULT_ROWS")
            .ok()
            .map(|n| n.parse::<usize>())
            .transpose()
            .context("INSIGHT_MAX_RESULT_ROWS must be a positive integer")?
            .unwrap_or(DEFAULT_MAX_RESULT_ROWS);

        let body_limit_bytes = std::env::var("INSIGHT_BODY_LIMIT_BYTES")
            .ok()
            .map(|n| n.parse::<usize>())
            .transpose()
            .context("INSIGHT_BODY_LIMIT_BYTES must be a positive integer")?
            .unwrap_or(DEFAULT_BODY_LIMIT_BYTES);

        let config = Self {
            host,
            port,
            max_result_rows,
            body_limit_bytes,
        };
        config
            .query_config()
            .validate()
            .map_err(anyhow::Error::msg)?;

        Ok(config)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Returns the query limits derived from this configuration.
    #[must_use]
    pub const fn query_config(&self) -> QueryConfig {
        QueryConfig::new(self.max_result_rows)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}
