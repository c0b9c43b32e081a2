//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TASKLISTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `TASKLISTS_HOST` - Bind address (default: 127.0.0.1)
//! - `TASKLISTS_PORT` - Listen port (default: 8000)
//! - `TASKLISTS_BASE_URL` - Public URL (default: <http://localhost:8000>); `https://` enables secure cookies
//! - `TASKLISTS_TRUSTED_PROXIES` - Comma-separated proxy IPs whose `X-Forwarded-For` is believed (default: none)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate in [0, 1] (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate in [0, 1] (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, for local development.
    #[default]
    Text,
    /// One JSON object per event, for log aggregation.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Application configuration.
///
/// `SecretString` keeps the database URL (which embeds a password) out of
/// `Debug` output.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Reverse proxies allowed to report the client address
    pub trusted_proxies: Vec<IpAddr>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TASKLISTS_DATABASE_URL")?;
        let host = get_env_or_default("TASKLISTS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TASKLISTS_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("TASKLISTS_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TASKLISTS_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("TASKLISTS_BASE_URL", "http://localhost:8000");
        let trusted_proxies = get_optional_env("TASKLISTS_TRUSTED_PROXIES")
            .map_or(Ok(Vec::new()), |raw| parse_ip_list(&raw))
            .map_err(|e| ConfigError::InvalidEnvVar("TASKLISTS_TRUSTED_PROXIES".to_string(), e))?;
        let log_format = get_env_or_default("LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            trusted_proxies,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an optional sample rate, defaulting to 1.0.
fn get_sample_rate(key: &str) -> Result<f32, ConfigError> {
    get_optional_env(key).map_or(Ok(1.0), |raw| {
        parse_sample_rate(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
    })
}

/// Parse a comma-separated list of IP addresses, ignoring empty entries.
fn parse_ip_list(raw: &str) -> Result<Vec<IpAddr>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<IpAddr>().map_err(|e| format!("`{s}`: {e}")))
        .collect()
}

/// Parse a sampling fraction, which must lie in `[0, 1]`.
fn parse_sample_rate(raw: &str) -> Result<f32, String> {
    let rate = raw.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be between 0 and 1 (got {rate})"))
    }
}
