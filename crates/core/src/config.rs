use std::collections::HashMap;
use std::fmt;

use chrono_tz::Tz;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ticker::Ticker;

/// TD Ameritrade option chain endpoint.
pub const TDA_CHAINS_URL: &str = "https://api.tdameritrade.com/v1/marketdata/chains";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub schedule: ScheduleConfig,
    pub load: LoadConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Width of the forward expiration window, in calendar days.
    pub window_days: i64,
    pub strike_count: u32,
    pub contract_type: String,
    pub strike_range: String,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL without the password, e.g. `postgresql://etl@localhost/optionsdata`.
    pub url: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Six-field cron expression (seconds first).
    pub cron: String,
    /// IANA timezone the cron expression is evaluated in.
    pub timezone: String,
    /// Additional attempts after a failed run.
    pub retries: u32,
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub mode: LoadMode,
}

/// How rows are written to the destination table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// One auto-committed statement per row.
    #[default]
    Row,
    /// All rows in a single transaction.
    Batch,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["FB".to_string(), "GOOG".to_string()],
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            schedule: ScheduleConfig::default(),
            load: LoadConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: TDA_CHAINS_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            window_days: 45,
            strike_count: 50,
            contract_type: "PUT".to_string(),
            strike_range: "ALL".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://postgres@localhost:5432/optionsdata".to_string(),
            password: None,
            max_connections: 5,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "0 */30 8-21 * * Mon-Fri".to_string(),
            timezone: "America/New_York".to_string(),
            retries: 1,
            retry_delay_secs: 60,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("window_days", &self.window_days)
            .field("strike_count", &self.strike_count)
            .field("contract_type", &self.contract_type)
            .field("strike_range", &self.strike_range)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn non_blank(value: Option<&String>) -> Option<SecretString> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_string()))
}

impl ApiConfig {
    /// Returns the API key.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingCredential` if the key is absent or blank.
    pub fn api_key(&self) -> Result<SecretString, ConfigError> {
        non_blank(self.api_key.as_ref()).ok_or(ConfigError::MissingCredential("API_KEY"))
    }
}

impl DatabaseConfig {
    /// Returns the database password.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingCredential` if the password is absent or blank.
    pub fn password(&self) -> Result<SecretString, ConfigError> {
        non_blank(self.password.as_ref()).ok_or(ConfigError::MissingCredential("APP_DB_PASS"))
    }
}

impl ScheduleConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for an unknown IANA name.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Invalid(format!("unknown timezone '{}': {e}", self.timezone)))
    }
}

impl AppConfig {
    /// Parses the configured ticker list.
    ///
    /// Each ticker must own its table, so two entries that map to the same
    /// table name (`FB` twice, or `BRK.B` and `BRK-B`) are rejected.
    ///
    /// # Errors
    /// Returns an error if the list is empty, any ticker is invalid, or two
    /// tickers share a table.
    pub fn tickers(&self) -> Result<Vec<Ticker>, ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("tickers list is empty".to_string()));
        }
        let tickers = Ticker::parse_all(&self.tickers)?;

        let mut owners: HashMap<&str, &str> = HashMap::with_capacity(tickers.len());
        for ticker in &tickers {
            if let Some(first) = owners.insert(ticker.table_name(), ticker.symbol()) {
                return Err(ConfigError::Invalid(format!(
                    "tickers '{first}' and '{}' both map to table '{}'",
                    ticker.symbol(),
                    ticker.table_name()
                )));
            }
        }

        Ok(tickers)
    }

    /// Validates everything a scheduled or manual run needs.
    ///
    /// Credentials are checked first so that a missing key fails before
    /// anything else is reported.
    ///
    /// # Errors
    /// Returns the first configuration problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.api_key()?;
        self.database.password()?;
        self.tickers()?;
        self.schedule.tz()?;

        if self.api.window_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "api.window_days must be positive, got {}",
                self.api.window_days
            )));
        }
        if self.api.strike_count == 0 {
            return Err(ConfigError::Invalid(
                "api.strike_count must be positive".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
