//! Database repositories for the put-option chain ETL.
//!
//! Each repository provides typed access to one family of tables with
//! skip-on-conflict inserts and simple read-side queries.

pub mod contract_repo;

pub use contract_repo::{create_table_sql, insert_sql, ContractRepository, LoadReport};
