//! Table creation command.

use anyhow::{Context, Result};

use super::app::App;

/// Creates every configured ticker's table if it does not exist.
///
/// Does not need the API key.
///
/// # Errors
/// Returns an error if configuration, connection, or any DDL fails.
pub async fn run_ensure_tables(config_path: &str) -> Result<()> {
    let app = App::connect(config_path, false).await?;
    let repo = app.db.contracts();

    for ticker in &app.tickers {
        repo.ensure_table(ticker)
            .await
            .with_context(|| format!("Failed to ensure table for {ticker}"))?;
        tracing::info!(ticker = %ticker, table = ticker.table_name(), "Table ready");
    }

    app.db.close().await;
    Ok(())
}
