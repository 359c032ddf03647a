use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use polyfeed_core::BackendConfig;

#[derive(Debug, thiserror::Error)]
#[error("{name} must be a valid {expected}, got {value:?}")]
pub struct ConfigError {
    name: &'static str,
    expected: &'static str,
    value: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Where the content document lives. Remote when `BLOB_READ_WRITE_TOKEN` is set.
    pub backend: BackendConfig,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let blob_timeout = Duration::from_secs(parse_var("BLOB_TIMEOUT_SECS", 30, "u64")?);
        let backend = BackendConfig::select(
            env::var("BLOB_READ_WRITE_TOKEN").ok(),
            env::var("BLOB_STORE_URL").ok(),
            env::var("CONTENT_BLOB_KEY").ok(),
            env::var("CONTENT_FILE").ok().map(PathBuf::from),
            blob_timeout,
        );

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3030, "u16")?,
            backend,
            event_bus_capacity: parse_var("EVENT_BUS_CAPACITY", 1024, "usize")?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", 64 * 1024, "usize")?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}
