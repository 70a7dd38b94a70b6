//! Wiring shared by the commands that touch the database.

use std::sync::Arc;

use anyhow::{Context, Result};
use chain_etl_core::{AppConfig, ConfigLoader, Ticker};
use chain_etl_data::DatabaseClient;
use chain_etl_pipeline::{PgContractStore, TickerPipeline};
use chain_etl_scheduler::ChainScheduler;
use chain_etl_tda::TdaClient;

/// Loaded configuration plus an open database pool.
pub struct App {
    pub config: AppConfig,
    pub tickers: Vec<Ticker>,
    pub db: DatabaseClient,
}

impl App {
    /// Loads configuration and connects to the database.
    ///
    /// With `require_api` the full configuration is validated up front, so a
    /// missing API key fails here rather than on the first fetch.
    ///
    /// # Errors
    /// Returns an error if configuration is invalid or the database is unreachable.
    pub async fn connect(config_path: &str, require_api: bool) -> Result<Self> {
        let config = ConfigLoader::load(config_path)
            .with_context(|| format!("Failed to load config from {config_path}"))?;

        if require_api {
            config.validate().context("Invalid configuration")?;
        }
        let tickers = config.tickers().context("Invalid ticker list")?;

        let db = DatabaseClient::connect(&config.database).await?;

        Ok(Self {
            config,
            tickers,
            db,
        })
    }

    /// Builds the pipeline against the live API and database.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn pipeline(&self) -> Result<TickerPipeline> {
        let client = TdaClient::from_config(&self.config.api)?;
        let store = PgContractStore::new(self.db.contracts(), self.config.load.mode);

        tracing::debug!(mode = ?store.mode(), "Pipeline ready");
        Ok(TickerPipeline::new(Arc::new(client), Arc::new(store)))
    }

    /// Builds the scheduler for every configured ticker.
    ///
    /// # Errors
    /// Returns an error if the pipeline cannot be built.
    pub fn scheduler(&self) -> Result<ChainScheduler> {
        Ok(ChainScheduler::new(
            self.pipeline()?,
            self.tickers.clone(),
            self.config.schedule.clone(),
        ))
    }
}
