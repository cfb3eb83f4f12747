//! Error taxonomy for the pharmacy API client.
//!
//! Three families of failure (mirrored by the CLI's exit handling):
//! client-side validation, authentication expiry handled by the gateway,
//! and everything else surfaced as opaque messages.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionStoreError;

/// Errors that can occur when calling the pharmacy API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side input validation failed; no request was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// The refresh protocol was exhausted; the session has been cleared and
    /// the caller should navigate to the login entry point.
    #[error("session expired, log in again at {login_path}")]
    SessionExpired {
        /// Login entry point from configuration.
        login_path: String,
    },

    /// The server answered 2xx but reported failure in the response envelope.
    #[error("api error: {message}")]
    Api { message: String },

    /// Non-success HTTP status, message passed through opaquely.
    #[error("http {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Persisted session state could not be read or written.
    #[error("session store error: {0}")]
    Session(#[from] SessionStoreError),

    /// Configuration was invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Whether this is an unauthorized (HTTP 401) status error.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Whether the session was cleared and re-login is required.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Validation("passwords do not match".to_owned());
        assert_eq!(err.to_string(), "validation error: passwords do not match");

        let err = ApiError::Status {
            status: 404,
            message: "Product not found".to_owned(),
        };
        assert_eq!(err.to_string(), "http 404: Product not found");
    }

    #[test]
    fn test_session_expired_names_login_path() {
        let err = ApiError::SessionExpired {
            login_path: "/login".to_owned(),
        };
        assert!(err.to_string().contains("/login"));
        assert!(err.is_session_expired());
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Status {
            status: 401,
            message: "jwt expired".to_owned(),
        };
        assert!(err.is_unauthorized());

        let err = ApiError::Status {
            status: 403,
            message: "forbidden".to_owned(),
        };
        assert!(!err.is_unauthorized());
    }
}
