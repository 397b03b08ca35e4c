//! Service configuration.
//!
//! Loaded from an optional TOML file; every field has a production
//! default. Durations use humantime strings ("10m", "15s"). The listen
//! port comes from the `PORT` environment variable, falling back to 8080.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default listen port when `PORT` is unset.
const DEFAULT_PORT: u16 = 8080;

/// Burst capacity as a multiple of the steady admission rate.
const BURST_FACTOR: f64 = 30.0;

/// Sliding-window allowance as a multiple of the steady rate per second.
const WINDOW_FACTOR: f64 = 2.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Denominator for the server-load metric; does not cap admission on
    /// its own.
    pub max_concurrent_requests: i64,
    /// Token-bucket steady rate in requests per second; also the basis
    /// for the derived burst and window caps.
    pub request_rate_limit: f64,
    /// Total cache capacity across shards.
    pub cache_size: usize,
    /// Number of cache shards.
    pub cache_shards: usize,
    /// Default TTL for cache entries.
    #[serde(with = "humantime_serde")]
    pub cache_expiration: Duration,
    /// Worker count in the name-generation pool.
    pub generator_workers: usize,
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5000,
            request_rate_limit: 2000.0,
            cache_size: 5000,
            cache_shards: 64,
            cache_expiration: Duration::from_secs(600),
            generator_workers: 16,
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Token-bucket burst capacity derived from the steady rate.
    pub fn burst_capacity(&self) -> u64 {
        ((self.request_rate_limit * BURST_FACTOR) as u64).max(1)
    }

    /// Sliding-window ceiling per one-second window.
    pub fn window_max_requests(&self) -> usize {
        ((self.request_rate_limit * WINDOW_FACTOR) as usize).max(1)
    }

    /// Cache sweeps run at half the expiration interval.
    pub fn cache_cleanup_interval(&self) -> Duration {
        self.cache_expiration / 2
    }

    /// Listen address: `PORT` env override, otherwise 8080.
    pub fn listen_addr(&self) -> String {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        format!("0.0.0.0:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_profile() {
        let config = ServerConfig::default();
        assert_eq!(config.max_concurrent_requests, 5000);
        assert_eq!(config.burst_capacity(), 60_000);
        assert_eq!(config.window_max_requests(), 4000);
        assert_eq!(config.cache_cleanup_interval(), Duration::from_secs(300));
    }

    #[test]
    fn parses_humantime_durations() {
        let config: ServerConfig = toml::from_str(
            r#"
            request_rate_limit = 100.0
            cache_expiration = "5m"
            read_timeout = "1s"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_expiration, Duration::from_secs(300));
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.write_timeout, Duration::from_secs(20));
    }
}
