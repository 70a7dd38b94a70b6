//! One-shot run command.

use anyhow::{bail, Result};
use chain_etl_core::Ticker;
use clap::Args;

use super::app::App;

/// Arguments for the once command.
#[derive(Args, Debug, Clone)]
pub struct OnceArgs {
    /// Run only this ticker (e.g., "FB"); defaults to every configured ticker
    #[arg(long)]
    pub ticker: Option<String>,
}

/// Runs the pipeline now, with the configured retry policy.
///
/// # Errors
/// Returns an error if setup fails or any ticker's run fails.
pub async fn run_once(config_path: &str, args: OnceArgs) -> Result<()> {
    let app = App::connect(config_path, true).await?;
    let scheduler = app.scheduler()?;

    let outcomes = match args.ticker {
        Some(symbol) => scheduler.run_tickers(&[Ticker::parse(&symbol)?]).await,
        None => scheduler.run_once().await,
    };

    println!("{:<10} {:>10} {:>10} {:>10}", "TICKER", "CONTRACTS", "INSERTED", "SKIPPED");
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "{:<10} {:>10} {:>10} {:>10}",
                summary.ticker,
                summary.contracts,
                summary.load.inserted,
                summary.load.skipped()
            ),
            Err(e) => {
                failed += 1;
                println!("{:<10} FAILED ({}): {}", outcome.ticker.symbol(), e.step(), e);
            }
        }
    }

    app.db.close().await;

    if failed > 0 {
        bail!("{failed} of {} ticker run(s) failed", outcomes.len());
    }
    Ok(())
}
