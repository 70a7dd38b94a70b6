//! Core configuration for the put-option chain ETL.
//!
//! This crate provides:
//! - `AppConfig` and its sections (API, database, schedule, load)
//! - `ConfigLoader` for layered TOML + environment loading
//! - `Ticker` validation and destination table naming

pub mod config;
pub mod config_loader;
pub mod error;
pub mod ticker;

pub use config::{ApiConfig, AppConfig, DatabaseConfig, LoadConfig, LoadMode, ScheduleConfig};
pub use config_loader::ConfigLoader;
pub use error::ConfigError;
pub use ticker::Ticker;
