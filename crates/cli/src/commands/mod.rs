//! CLI commands for the chain ETL.

pub mod app;
pub mod ensure_tables;
pub mod flatten;
pub mod once;
pub mod run;
pub mod status;

pub use ensure_tables::run_ensure_tables;
pub use flatten::{run_flatten, FlattenArgs};
pub use once::{run_once, OnceArgs};
pub use run::run_scheduler;
pub use status::run_status;
