//! Scheduler daemon command.

use anyhow::Result;
use tokio::signal::unix::{signal, SignalKind};

use super::app::App;

/// Starts the per-ticker schedule and blocks until SIGINT or SIGTERM.
///
/// # Errors
/// Returns an error if configuration, connection, or scheduler startup fails.
pub async fn run_scheduler(config_path: &str) -> Result<()> {
    tracing::info!("Starting chain ETL daemon with config: {}", config_path);

    let app = App::connect(config_path, true).await?;
    let scheduler = app.scheduler()?;
    let mut handle = scheduler.start().await?;

    wait_for_shutdown().await?;

    tracing::info!("Stopping scheduler...");
    if let Err(e) = handle.shutdown().await {
        tracing::error!("Error during scheduler shutdown: {}", e);
    }
    app.db.close().await;

    tracing::info!("Chain ETL daemon stopped");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
    }

    Ok(())
}
