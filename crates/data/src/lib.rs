//! Data storage for the put-option chain ETL.
//!
//! This crate provides:
//! - Database client for `PostgreSQL`
//! - The normalized `ContractRow` model and its `-99` sentinels
//! - `ContractRepository` for per-ticker table DDL and skip-on-conflict inserts

pub mod database;
pub mod models;
pub mod repositories;

// Re-export commonly used types
pub use database::DatabaseClient;

// Re-export models
pub use models::{
    ContractRow, COLUMNS, SENTINEL_BIGINT, SENTINEL_FLOAT, SENTINEL_INT, SENTINEL_TEXT,
};

// Re-export repositories
pub use repositories::{ContractRepository, LoadReport};
