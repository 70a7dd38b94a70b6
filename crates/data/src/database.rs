use std::str::FromStr;

use anyhow::{Context, Result};
use chain_etl_core::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::repositories::ContractRepository;

pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Connects to `PostgreSQL` using the configured URL and password.
    ///
    /// The password is applied to the connect options rather than the URL so
    /// it never appears in logs.
    ///
    /// # Errors
    /// Returns an error if the password is missing, the URL is malformed, or
    /// the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let password = config.password()?;
        let options = PgConnectOptions::from_str(&config.url)
            .with_context(|| format!("invalid database url '{}'", config.url))?
            .password(password.expose_secret());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .context("failed to connect to database")?;

        tracing::info!(url = %config.url, "connected to database");
        Ok(Self { pool })
    }

    /// Returns a contract repository sharing this client's pool.
    #[must_use]
    pub fn contracts(&self) -> ContractRepository {
        ContractRepository::new(self.pool.clone())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
