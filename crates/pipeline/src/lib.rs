//! Put option chain pipeline.
//!
//! For one ticker: ensure the destination table, fetch the put chain,
//! flatten it into contract rows, and load the rows idempotently.

pub mod error;
pub mod flatten;
pub mod pipeline;
pub mod traits;

pub use error::{NormalizeError, PipelineError};
pub use flatten::{flatten, normalize_contract};
pub use pipeline::{RunSummary, TickerPipeline};
pub use traits::{ChainSource, ContractStore, PgContractStore};
