//! Table status command.

use anyhow::Result;
use chrono::DateTime;

use super::app::App;

fn format_quote_time(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Prints row count and latest quote time for each ticker's table.
///
/// A table that cannot be queried (usually not created yet) is reported and
/// skipped.
///
/// # Errors
/// Returns an error if configuration or connection fails.
pub async fn run_status(config_path: &str) -> Result<()> {
    let app = App::connect(config_path, false).await?;
    let repo = app.db.contracts();

    println!("{:<10} {:<16} {:>10}  {}", "TICKER", "TABLE", "ROWS", "LATEST QUOTE");
    for ticker in &app.tickers {
        let status = async {
            let count = repo.count(ticker).await?;
            let latest = repo.latest_quote_time(ticker).await?;
            anyhow::Ok((count, latest))
        }
        .await;

        match status {
            Ok((count, latest)) => println!(
                "{:<10} {:<16} {:>10}  {}",
                ticker.symbol(),
                ticker.table_name(),
                count,
                format_quote_time(latest)
            ),
            Err(e) => {
                tracing::warn!("Failed to query {}: {}", ticker.table_name(), e);
                println!(
                    "{:<10} {:<16} {:>10}  {}",
                    ticker.symbol(),
                    ticker.table_name(),
                    "-",
                    "unavailable"
                );
            }
        }
    }

    app.db.close().await;
    Ok(())
}
