use clap::{Parser, Subcommand};

mod commands;

use commands::{FlattenArgs, OnceArgs};

#[derive(Parser)]
#[command(name = "chain-etl")]
#[command(about = "Scheduled put-option chain ETL into PostgreSQL", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the per-ticker schedule until SIGINT/SIGTERM
    Run,
    /// Run the pipeline immediately for one or all tickers
    Once(OnceArgs),
    /// Create every configured ticker's table if missing
    EnsureTables,
    /// Flatten a saved chain response into CSV (no credentials needed)
    Flatten(FlattenArgs),
    /// Show row counts and latest quote times per ticker
    Status,
}

fn init_tracing(log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run => {
            commands::run_scheduler(&cli.config).await?;
        }
        Commands::Once(args) => {
            commands::run_once(&cli.config, args).await?;
        }
        Commands::EnsureTables => {
            commands::run_ensure_tables(&cli.config).await?;
        }
        Commands::Flatten(args) => {
            commands::run_flatten(args)?;
        }
        Commands::Status => {
            commands::run_status(&cli.config).await?;
        }
    }

    Ok(())
}
