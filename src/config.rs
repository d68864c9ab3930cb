//! Environment-driven service configuration.

use std::time::Duration;

use snafu::Snafu;
use tollgate_constants::coordination::DEFAULT_MAX_SLEEP_MS;
use tollgate_constants::network::{DEFAULT_HOST, DEFAULT_PORT};

/// Configuration errors raised while reading the environment.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[snafu(display("invalid value '{value}' for {key}: {reason}"))]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Service configuration.
///
/// Everything is read from the environment with defaults; the process
/// keeps no other configuration source and no persisted state.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (`HOST`).
    pub host: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Log filter directive (`LOG_LEVEL`), e.g. `info` or `debug`.
    pub log_level: String,
    /// Upper bound on any single wake-loop sleep (`MAX_SLEEP_MS`).
    pub max_sleep: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port_raw = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let port = port_raw
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port_raw.clone(),
                reason: format!("must be a valid port number (0-65535): {}", e),
            })?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_sleep_raw =
            std::env::var("MAX_SLEEP_MS").unwrap_or_else(|_| DEFAULT_MAX_SLEEP_MS.to_string());
        let max_sleep_ms = max_sleep_raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "MAX_SLEEP_MS".to_string(),
                value: max_sleep_raw.clone(),
                reason: format!("must be a duration in milliseconds: {}", e),
            })?;
        if max_sleep_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_SLEEP_MS".to_string(),
                value: max_sleep_raw,
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            log_level,
            max_sleep: Duration::from_millis(max_sleep_ms),
        })
    }

    /// The address to bind the listener to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            max_sleep: Duration::from_millis(DEFAULT_MAX_SLEEP_MS),
        }
    }
}
