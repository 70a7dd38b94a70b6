//! Configuration errors.
//!
//! Every variant is fatal at startup: nothing is scheduled or fetched
//! until the configuration validates.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// A required credential is absent or blank.
    #[error("missing credential: {0} must be set")]
    MissingCredential(&'static str),

    /// Ticker cannot be mapped to a destination table.
    #[error("invalid ticker '{ticker}': {reason}")]
    InvalidTicker {
        /// The rejected ticker as configured.
        ticker: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Any other invalid setting.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid ticker error.
    pub fn invalid_ticker(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTicker {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}
