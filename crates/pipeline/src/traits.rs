//! Seams between the pipeline and its external systems.

use anyhow::Result;
use async_trait::async_trait;
use chain_etl_core::{LoadMode, Ticker};
use chain_etl_data::{ContractRepository, ContractRow, LoadReport};
use chain_etl_tda::{RawChainResponse, TdaClient, TdaError};
use chrono::{DateTime, Utc};

/// Source of put option chains.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Fetches the put chain for `ticker` over the window starting at `now`.
    async fn fetch_put_chain(
        &self,
        ticker: &Ticker,
        now: DateTime<Utc>,
    ) -> std::result::Result<RawChainResponse, TdaError>;
}

/// Destination for normalized contract rows.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Creates the ticker's table if absent; safe to call repeatedly.
    async fn ensure_table(&self, ticker: &Ticker) -> Result<()>;

    /// Writes rows, skipping any whose (symbol, quote_time) already exists.
    async fn load(&self, ticker: &Ticker, rows: &[ContractRow]) -> Result<LoadReport>;
}

#[async_trait]
impl ChainSource for TdaClient {
    async fn fetch_put_chain(
        &self,
        ticker: &Ticker,
        now: DateTime<Utc>,
    ) -> std::result::Result<RawChainResponse, TdaError> {
        TdaClient::fetch_put_chain(self, ticker.symbol(), now).await
    }
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgContractStore {
    repo: ContractRepository,
    mode: LoadMode,
}

impl PgContractStore {
    #[must_use]
    pub fn new(repo: ContractRepository, mode: LoadMode) -> Self {
        Self { repo, mode }
    }

    #[must_use]
    pub fn mode(&self) -> LoadMode {
        self.mode
    }
}

#[async_trait]
impl ContractStore for PgContractStore {
    async fn ensure_table(&self, ticker: &Ticker) -> Result<()> {
        self.repo.ensure_table(ticker).await
    }

    async fn load(&self, ticker: &Ticker, rows: &[ContractRow]) -> Result<LoadReport> {
        match self.mode {
            LoadMode::Row => self.repo.insert_rows(ticker, rows).await,
            LoadMode::Batch => self.repo.insert_batch(ticker, rows).await,
        }
    }
}
