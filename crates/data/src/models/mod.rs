//! Data models for the put-option chain ETL.
//!
//! Models derive `sqlx::FromRow` for database compatibility.

pub mod contract;

pub use contract::{
    ContractRow, COLUMNS, SENTINEL_BIGINT, SENTINEL_FLOAT, SENTINEL_INT, SENTINEL_TEXT,
};
