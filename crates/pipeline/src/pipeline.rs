//! One ticker's ensure → fetch → flatten → load run.
//!
//! Steps run strictly in order and the first failure aborts the run. Rows
//! loaded before a failure stay in the table; because the load skips
//! existing keys, rerunning is always safe.

use std::sync::Arc;

use chain_etl_core::Ticker;
use chain_etl_data::LoadReport;
use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::flatten::flatten;
use crate::traits::{ChainSource, ContractStore};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticker symbol as configured.
    pub ticker: String,
    /// Contracts found in the chain.
    pub contracts: usize,
    /// Cells filled with the sentinel across all rows.
    pub sentinel_cells: usize,
    pub load: LoadReport,
}

/// Runs the pipeline for individual tickers.
#[derive(Clone)]
pub struct TickerPipeline {
    source: Arc<dyn ChainSource>,
    store: Arc<dyn ContractStore>,
}

impl std::fmt::Debug for TickerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerPipeline").finish_non_exhaustive()
    }
}

impl TickerPipeline {
    #[must_use]
    pub fn new(source: Arc<dyn ChainSource>, store: Arc<dyn ContractStore>) -> Self {
        Self { source, store }
    }

    /// Ensures the destination table exists without fetching anything.
    ///
    /// # Errors
    /// Returns `PipelineError::EnsureTable` if the DDL fails.
    pub async fn ensure_table(&self, ticker: &Ticker) -> Result<(), PipelineError> {
        self.store
            .ensure_table(ticker)
            .await
            .map_err(|source| PipelineError::EnsureTable {
                ticker: ticker.symbol().to_string(),
                source,
            })
    }

    /// Runs ensure → fetch → flatten → load for one ticker.
    ///
    /// # Errors
    /// Returns the first step's failure; later steps are not attempted.
    pub async fn run(
        &self,
        ticker: &Ticker,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, PipelineError> {
        let symbol = ticker.symbol().to_string();

        self.ensure_table(ticker).await?;

        let raw = self
            .source
            .fetch_put_chain(ticker, now)
            .await
            .map_err(|source| PipelineError::Fetch {
                ticker: symbol.clone(),
                source,
            })?;

        let rows = flatten(&raw).map_err(|source| PipelineError::Normalize {
            ticker: symbol.clone(),
            source,
        })?;

        let sentinel_cells: usize = rows.iter().map(|row| row.sentinel_columns().len()).sum();
        tracing::debug!(ticker = %symbol, contracts = rows.len(), sentinel_cells, "Chain flattened");

        let load = self
            .store
            .load(ticker, &rows)
            .await
            .map_err(|source| PipelineError::Load {
                ticker: symbol.clone(),
                source,
            })?;

        tracing::info!(
            ticker = %symbol,
            table = ticker.table_name(),
            contracts = rows.len(),
            inserted = load.inserted,
            skipped = load.skipped(),
            "Chain loaded"
        );

        Ok(RunSummary {
            ticker: symbol,
            contracts: rows.len(),
            sentinel_cells,
            load,
        })
    }
}
