//! Cron scheduling for the chain pipeline.
//!
//! Each configured ticker gets its own job; a failed run is retried a fixed
//! number of times with a fixed delay.

pub mod scheduler;

pub use scheduler::{run_with_retries, ChainScheduler, RetryPolicy, TickerOutcome};
