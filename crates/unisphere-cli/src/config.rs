use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API URL must not be empty")]
    EmptyUrl,

    #[error("API URL must start with http:// or https:// (got {0})")]
    UnsupportedScheme(String),

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Validated client settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Sources, highest precedence first:
    /// - `--api-url` / `UNISPHERE_API_URL` (default `http://localhost:5000`)
    /// - `--timeout-secs` / `UNISPHERE_TIMEOUT_SECS` (default 30)
    ///
    /// clap resolves flag vs. environment; this only validates.
    pub fn new(api_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        let api_url = api_url.trim();
        if api_url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(api_url.to_string()));
        }
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
