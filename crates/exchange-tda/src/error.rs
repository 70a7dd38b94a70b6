//! Error types for the option chain fetcher.
//!
//! Every fetch failure is surfaced to the caller; the scheduler decides
//! whether to retry.

use thiserror::Error;

/// Errors that can occur when fetching an option chain.
#[derive(Debug, Error)]
pub enum TdaError {
    /// Fetcher could not be constructed from configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// API answered with a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body, truncated.
        message: String,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Body was not a JSON chain response.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl TdaError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if the error indicates the request may succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::Configuration(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for TdaError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TdaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for fetcher operations.
pub type Result<T> = std::result::Result<T, TdaError>;
