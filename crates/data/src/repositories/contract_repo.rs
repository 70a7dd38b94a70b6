//! Per-ticker contract repository.
//!
//! Every ticker has its own table. Statements are built once per call from
//! the validated, quoted table identifier; all row values are bound as
//! parameters.

use anyhow::Result;
use chain_etl_core::Ticker;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use crate::models::{ContractRow, COLUMNS};

/// Rows per chunk when loading inside a transaction.
const BATCH_CHUNK_SIZE: usize = 100;

/// Outcome of loading a set of rows into a ticker's table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows submitted.
    pub attempted: usize,
    /// Rows actually written; the rest collided on (symbol, quote_time).
    pub inserted: u64,
}

impl LoadReport {
    /// Rows skipped because their primary key already existed.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        (self.attempted as u64).saturating_sub(self.inserted)
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: LoadReport) {
        self.attempted += other.attempted;
        self.inserted += other.inserted;
    }
}

/// Returns the idempotent DDL for a ticker's table.
#[must_use]
pub fn create_table_sql(ticker: &Ticker) -> String {
    format!(
        r"
        CREATE TABLE IF NOT EXISTS {} (
            put_call VARCHAR(5) NOT NULL,
            symbol VARCHAR(32) NOT NULL,
            description VARCHAR(64) NOT NULL,
            bid DOUBLE PRECISION,
            ask DOUBLE PRECISION,
            last DOUBLE PRECISION,
            bid_size INTEGER,
            ask_size INTEGER,
            last_size INTEGER,
            high_price DOUBLE PRECISION,
            low_price DOUBLE PRECISION,
            open_price DOUBLE PRECISION,
            close_price DOUBLE PRECISION,
            total_volume INTEGER,
            quote_time BIGINT,
            volatility DOUBLE PRECISION,
            delta DOUBLE PRECISION,
            gamma DOUBLE PRECISION,
            theta DOUBLE PRECISION,
            vega DOUBLE PRECISION,
            rho DOUBLE PRECISION,
            open_interest INTEGER,
            time_value DOUBLE PRECISION,
            theoretical_value DOUBLE PRECISION,
            strike_price DOUBLE PRECISION,
            expiration_date BIGINT,
            dte INTEGER,
            PRIMARY KEY (symbol, quote_time)
        )
        ",
        ticker.quoted_table()
    )
}

/// Returns the skip-on-conflict insert for a ticker's table.
#[must_use]
pub fn insert_sql(ticker: &Ticker) -> String {
    let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        ticker.quoted_table(),
        COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

fn bind_row<'q>(
    query: Query<'q, Postgres, PgArguments>,
    row: &'q ContractRow,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(&row.put_call)
        .bind(&row.symbol)
        .bind(&row.description)
        .bind(row.bid)
        .bind(row.ask)
        .bind(row.last)
        .bind(row.bid_size)
        .bind(row.ask_size)
        .bind(row.last_size)
        .bind(row.high_price)
        .bind(row.low_price)
        .bind(row.open_price)
        .bind(row.close_price)
        .bind(row.total_volume)
        .bind(row.quote_time)
        .bind(row.volatility)
        .bind(row.delta)
        .bind(row.gamma)
        .bind(row.theta)
        .bind(row.vega)
        .bind(row.rho)
        .bind(row.open_interest)
        .bind(row.time_value)
        .bind(row.theoretical_value)
        .bind(row.strike_price)
        .bind(row.expiration_date)
        .bind(row.dte)
}

/// Repository for per-ticker contract tables.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the ticker's table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn ensure_table(&self, ticker: &Ticker) -> Result<()> {
        let ddl = create_table_sql(ticker);
        sqlx::query(&ddl).execute(&self.pool).await?;

        tracing::debug!(ticker = %ticker, table = ticker.table_name(), "table ensured");
        Ok(())
    }

    /// Inserts a single row, skipping it on primary-key conflict.
    ///
    /// Returns `true` if the row was written.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, ticker: &Ticker, row: &ContractRow) -> Result<bool> {
        let sql = insert_sql(ticker);
        let result = bind_row(sqlx::query(&sql), row)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Inserts rows one statement at a time, each committed on its own.
    ///
    /// Stops at the first failing row; rows before it stay committed and
    /// are skipped on a retry.
    ///
    /// # Errors
    /// Returns an error if any insert fails.
    pub async fn insert_rows(&self, ticker: &Ticker, rows: &[ContractRow]) -> Result<LoadReport> {
        let sql = insert_sql(ticker);
        let mut report = LoadReport::default();

        for row in rows {
            let result = bind_row(sqlx::query(&sql), row)
                .execute(&self.pool)
                .await?;
            report.attempted += 1;
            report.inserted += result.rows_affected();
        }

        Ok(report)
    }

    /// Inserts a batch of rows in a single transaction.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails; nothing is committed.
    pub async fn insert_batch(&self, ticker: &Ticker, rows: &[ContractRow]) -> Result<LoadReport> {
        if rows.is_empty() {
            return Ok(LoadReport::default());
        }

        let sql = insert_sql(ticker);
        let mut report = LoadReport::default();
        let mut tx = self.pool.begin().await?;

        for chunk in rows.chunks(BATCH_CHUNK_SIZE) {
            for row in chunk {
                let result = bind_row(sqlx::query(&sql), row)
                    .execute(&mut *tx)
                    .await?;
                report.attempted += 1;
                report.inserted += result.rows_affected();
            }
        }

        tx.commit().await?;
        Ok(report)
    }

    /// Counts rows in the ticker's table.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, ticker: &Ticker) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", ticker.quoted_table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Gets the most recent quote time stored for the ticker.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_quote_time(&self, ticker: &Ticker) -> Result<Option<i64>> {
        let sql = format!("SELECT MAX(quote_time) FROM {}", ticker.quoted_table());
        let latest: Option<i64> = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(latest)
    }

    /// Queries all contracts quoted at a given time.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_quote_time(
        &self,
        ticker: &Ticker,
        quote_time: i64,
    ) -> Result<Vec<ContractRow>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE quote_time = $1 ORDER BY symbol ASC",
            COLUMNS.join(", "),
            ticker.quoted_table()
        );
        let rows = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(quote_time)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
