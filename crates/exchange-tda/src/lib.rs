//! TD Ameritrade option chain integration for the put-option chain ETL.
//!
//! This crate provides:
//! - `TdaClient`, a REST client for the `marketdata/chains` endpoint
//! - `ChainWindow`, the 45-day forward expiration window
//! - `RawChainResponse`, the undecoded nested chain payload
//!
//! # Authentication
//!
//! The endpoint takes the API key as the `apikey` query parameter. The key
//! is held as a `SecretString` and stripped from every surfaced error.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChainWindow, TdaClient, TdaClientConfig, MARKET_TZ, TDA_CHAINS_URL};
pub use error::{Result, TdaError};
pub use types::RawChainResponse;
