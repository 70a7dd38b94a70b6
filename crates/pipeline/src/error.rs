//! Error types for a single ticker's pipeline run.
//!
//! Each variant names the step that failed. Any error aborts the run; the
//! rows committed before a load failure stay committed.

use chain_etl_core::ConfigError;
use chain_etl_tda::TdaError;
use thiserror::Error;

/// Structural problems in a chain response.
///
/// Missing scalar fields are never errors; they become sentinels.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The response carries no put map at all.
    #[error("response has no putExpDateMap")]
    MissingPutMap,

    /// A level of the nested map has the wrong JSON type.
    #[error("malformed chain at {location}: {reason}")]
    Structure {
        /// Path to the offending node, e.g. `2022-02-18:45/100.0[3]`.
        location: String,
        /// What was expected there.
        reason: &'static str,
    },
}

impl NormalizeError {
    /// Creates a structure error.
    pub fn structure(location: impl Into<String>, reason: &'static str) -> Self {
        Self::Structure {
            location: location.into(),
            reason,
        }
    }
}

/// Errors from one ticker's ensure → fetch → flatten → load run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ticker could not be mapped to a table.
    #[error(transparent)]
    InvalidTicker(#[from] ConfigError),

    /// Destination table could not be created.
    #[error("{ticker}: failed to ensure table: {source}")]
    EnsureTable {
        ticker: String,
        #[source]
        source: anyhow::Error,
    },

    /// Chain could not be fetched.
    #[error("{ticker}: failed to fetch chain: {source}")]
    Fetch {
        ticker: String,
        #[source]
        source: TdaError,
    },

    /// Chain response was structurally broken.
    #[error("{ticker}: failed to normalize chain: {source}")]
    Normalize {
        ticker: String,
        #[source]
        source: NormalizeError,
    },

    /// Rows could not be written.
    #[error("{ticker}: failed to load rows: {source}")]
    Load {
        ticker: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Name of the step that failed.
    #[must_use]
    pub fn step(&self) -> &'static str {
        match self {
            Self::InvalidTicker(_) => "config",
            Self::EnsureTable { .. } => "ensure_table",
            Self::Fetch { .. } => "fetch",
            Self::Normalize { .. } => "normalize",
            Self::Load { .. } => "load",
        }
    }
}
