//! Ticker symbols and their destination tables.
//!
//! Each ticker owns one table. The table identifier is derived from the
//! symbol and is the only piece of SQL text that is ever interpolated, so
//! it is validated here and always emitted double-quoted.

use std::fmt;

use crate::error::ConfigError;

/// PostgreSQL truncates identifiers longer than this.
const MAX_IDENTIFIER_LEN: usize = 63;

/// A validated ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker {
    symbol: String,
    table: String,
}

impl Ticker {
    /// Validates a ticker and derives its table name.
    ///
    /// The table name is the lower-cased symbol with `.`, `-` and `/`
    /// mapped to `_` (e.g. `BRK.B` becomes `brk_b`).
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidTicker` if the symbol is empty, contains
    /// characters outside `[A-Za-z0-9._/-]`, does not start with a letter,
    /// or produces an identifier longer than 63 bytes.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let symbol = raw.trim();

        if symbol.is_empty() {
            return Err(ConfigError::invalid_ticker(raw, "ticker cannot be empty"));
        }

        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '/' | '_')))
        {
            return Err(ConfigError::invalid_ticker(
                raw,
                format!("unsupported character '{bad}'"),
            ));
        }

        if !symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(ConfigError::invalid_ticker(raw, "must start with a letter"));
        }

        if symbol.len() > MAX_IDENTIFIER_LEN {
            return Err(ConfigError::invalid_ticker(
                raw,
                format!("exceeds maximum length of {MAX_IDENTIFIER_LEN}"),
            ));
        }

        let table = symbol
            .chars()
            .map(|c| match c {
                '.' | '-' | '/' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        Ok(Self {
            symbol: symbol.to_string(),
            table,
        })
    }

    /// Parses a list of tickers, failing on the first invalid entry.
    ///
    /// # Errors
    /// Returns the first `ConfigError::InvalidTicker` encountered.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>, ConfigError> {
        raw.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    /// The symbol as sent to the upstream API.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The unquoted destination table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The destination table name quoted for direct use in SQL.
    #[must_use]
    pub fn quoted_table(&self) -> String {
        format!("\"{}\"", self.table)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}
