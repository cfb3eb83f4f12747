//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MADINA_API_BASE_URL` - Base URL of the pharmacy REST API
//!   (e.g., `https://api.madinapharmacy.example/api`)
//!
//! ## Optional
//! - `MADINA_API_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `MADINA_SESSION_FILE` - Path for the persisted session document
//! - `MADINA_LOGIN_PATH` - Login entry point reported on session expiry
//!   (default: /login)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid base URL {0}: {1}")]
    InvalidBaseUrl(String, String),
}

/// Pharmacy API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Path of the persisted session document, when file persistence is used.
    pub session_file: Option<PathBuf>,
    /// Login entry point surfaced when the session expires.
    pub login_path: String,
}

impl ApiConfig {
    /// Create a configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: None,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        })
    }

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

        let base_url = validate_base_url(&get_required_env("MADINA_API_BASE_URL")?)?;
        let timeout_secs = get_env_or_default(
            "MADINA_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("MADINA_API_TIMEOUT_SECS".to_owned(), e.to_string())
        })?;
        let session_file = get_optional_env("MADINA_SESSION_FILE").map(PathBuf::from);
        let login_path = get_env_or_default("MADINA_LOGIN_PATH", DEFAULT_LOGIN_PATH);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
            login_path,
        })
    }

    /// Base URL of the API, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Override the session file path.
    #[must_use]
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = Some(path);
        self
    }
}

/// Parse and normalize the base URL (absolute http(s), no trailing slash).
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidBaseUrl(raw.to_owned(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl(
            raw.to_owned(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl(
            raw.to_owned(),
            "missing host".to_owned(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_owned())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = ApiConfig::new("https://api.example.com/api/").unwrap();
        assert_eq!(config.base_url(), "https://api.example.com/api");
    }

    #[test]
    fn test_base_url_rejects_relative() {
        assert!(matches!(
            ApiConfig::new("/api"),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_base_url_rejects_non_http_scheme() {
        assert!(matches!(
            ApiConfig::new("ftp://api.example.com"),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::new("http://localhost:5000/api").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.login_path, "/login");
        assert!(config.session_file.is_none());
    }
}
