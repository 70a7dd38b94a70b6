//! Option chain REST client.
//!
//! Issues one GET per ticker against the chains endpoint, restricted to
//! puts within a fixed forward expiration window.
//!
//! # Example
//!
//! ```ignore
//! use chain_etl_tda::{TdaClient, TdaClientConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TdaClient::new(TdaClientConfig::default(), SecretString::from("key"))?;
//!     let chain = client.fetch_put_chain("FB", chrono::Utc::now()).await?;
//!     println!("{:?} -> {:?}", chain.symbol, chain.status);
//!     Ok(())
//! }
//! ```

use chain_etl_core::ApiConfig;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, TdaError};
use crate::types::RawChainResponse;

// =============================================================================
// Constants
// =============================================================================

/// Chains endpoint.
pub const TDA_CHAINS_URL: &str = chain_etl_core::config::TDA_CHAINS_URL;

/// Timezone the expiration window is anchored in.
pub const MARKET_TZ: Tz = chrono_tz::America::New_York;

/// Longest error body kept in `TdaError::Api`.
const MAX_ERROR_BODY: usize = 512;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the chain client.
#[derive(Debug, Clone)]
pub struct TdaClientConfig {
    /// Full URL of the chains endpoint.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Width of the expiration window in calendar days.
    pub window_days: i64,

    /// Number of strikes around the money.
    pub strike_count: u32,

    /// Contract type filter.
    pub contract_type: String,

    /// Strike range filter.
    pub strike_range: String,
}

impl Default for TdaClientConfig {
    fn default() -> Self {
        Self {
            base_url: TDA_CHAINS_URL.to_string(),
            timeout_secs: 30,
            window_days: 45,
            strike_count: 50,
            contract_type: "PUT".to_string(),
            strike_range: "ALL".to_string(),
        }
    }
}

impl TdaClientConfig {
    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl From<&ApiConfig> for TdaClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout_secs: api.timeout_secs,
            window_days: api.window_days,
            strike_count: api.strike_count,
            contract_type: api.contract_type.clone(),
            strike_range: api.strike_range.clone(),
        }
    }
}

// =============================================================================
// Expiration window
// =============================================================================

/// Forward expiration window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ChainWindow {
    /// Builds the window starting on `now`'s market-local date.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, days: i64) -> Self {
        let from = now.with_timezone(&MARKET_TZ).date_naive();
        Self {
            from,
            to: from + Duration::days(days),
        }
    }

    /// Query parameter form of the start date.
    #[must_use]
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    /// Query parameter form of the end date.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

// =============================================================================
// TdaClient
// =============================================================================

/// Option chain REST client.
pub struct TdaClient {
    config: TdaClientConfig,
    http: Client,
    api_key: SecretString,
}

impl std::fmt::Debug for TdaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TdaClient")
            .field("base_url", &self.config.base_url)
            .field("window_days", &self.config.window_days)
            .finish_non_exhaustive()
    }
}

impl TdaClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: TdaClientConfig, api_key: SecretString) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TdaError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            api_key,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    /// Returns `TdaError::Configuration` if the API key is missing.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let api_key = api
            .api_key()
            .map_err(|e| TdaError::Configuration(e.to_string()))?;
        Self::new(TdaClientConfig::from(api), api_key)
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the window a fetch at `now` would request.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>) -> ChainWindow {
        ChainWindow::starting_at(now, self.config.window_days)
    }

    fn query_params(&self, symbol: &str, window: &ChainWindow) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.expose_secret().to_string()),
            ("symbol", symbol.to_string()),
            ("contractType", self.config.contract_type.clone()),
            ("strikeCount", self.config.strike_count.to_string()),
            ("range", self.config.strike_range.clone()),
            ("fromDate", window.from_param()),
            ("toDate", window.to_param()),
        ]
    }

    /// Fetches the put chain for `symbol` over the window starting at `now`.
    ///
    /// # Errors
    /// Returns an error on transport failure, timeout, non-success status,
    /// or a body that is not a JSON chain response.
    pub async fn fetch_put_chain(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<RawChainResponse> {
        let window = self.window(now);

        tracing::debug!(
            symbol,
            from = %window.from,
            to = %window.to,
            "Fetching put chain"
        );

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&self.query_params(symbol, &window))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TdaError::api(status.as_u16(), truncate_body(text)));
        }

        let body = response.bytes().await?;
        let chain = RawChainResponse::from_slice(&body)?;

        if !chain.is_success() {
            tracing::warn!(
                symbol,
                status = chain.status.as_deref().unwrap_or_default(),
                "Chain request reported non-success status"
            );
        }

        Ok(chain)
    }
}
