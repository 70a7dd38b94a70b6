use anyhow::{Context, Result};
use chain_etl_core::{ScheduleConfig, Ticker};
use chain_etl_pipeline::{PipelineError, RunSummary, TickerPipeline};
use chrono::Utc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// How a failed ticker run is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl From<&ScheduleConfig> for RetryPolicy {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            retries: config.retries,
            delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Result of one ticker's run, after retries.
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: Ticker,
    pub result: Result<RunSummary, PipelineError>,
}

impl TickerOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one ticker, retrying the whole run on failure.
///
/// Every attempt takes a fresh "now" so the fetch window follows the clock.
///
/// # Errors
/// Returns the last attempt's error once retries are exhausted.
pub async fn run_with_retries(
    pipeline: &TickerPipeline,
    ticker: &Ticker,
    policy: RetryPolicy,
) -> Result<RunSummary, PipelineError> {
    let mut attempt = 0;
    loop {
        match pipeline.run(ticker, Utc::now()).await {
            Ok(summary) => return Ok(summary),
            Err(e) if attempt < policy.retries => {
                attempt += 1;
                warn!(
                    ticker = %ticker,
                    step = e.step(),
                    attempt,
                    retries = policy.retries,
                    "Run failed, retrying in {:?}: {}",
                    policy.delay,
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Schedules one independent cron job per ticker.
pub struct ChainScheduler {
    pipeline: TickerPipeline,
    tickers: Vec<Ticker>,
    schedule: ScheduleConfig,
}

impl ChainScheduler {
    /// Creates a new chain scheduler.
    #[must_use]
    pub fn new(pipeline: TickerPipeline, tickers: Vec<Ticker>, schedule: ScheduleConfig) -> Self {
        Self {
            pipeline,
            tickers,
            schedule,
        }
    }

    #[must_use]
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Registers every ticker's job and starts the scheduler.
    ///
    /// The returned handle keeps running until shut down. Missed firings are
    /// not caught up.
    ///
    /// # Errors
    /// Returns an error if the timezone or cron expression is invalid, or if
    /// the scheduler fails to start.
    pub async fn start(&self) -> Result<JobScheduler> {
        let tz = self.schedule.tz()?;
        let policy = RetryPolicy::from(&self.schedule);

        info!(
            cron = %self.schedule.cron,
            timezone = %tz,
            tickers = self.tickers.len(),
            "Starting chain scheduler"
        );

        let scheduler = JobScheduler::new().await?;

        for ticker in &self.tickers {
            let pipeline = self.pipeline.clone();
            let job_ticker = ticker.clone();

            let job = Job::new_async_tz(self.schedule.cron.as_str(), tz, move |_uuid, _lock| {
                let pipeline = pipeline.clone();
                let ticker = job_ticker.clone();
                Box::pin(async move {
                    match run_with_retries(&pipeline, &ticker, policy).await {
                        Ok(summary) => info!(
                            ticker = %ticker,
                            contracts = summary.contracts,
                            inserted = summary.load.inserted,
                            "Scheduled run completed"
                        ),
                        Err(e) => {
                            error!(ticker = %ticker, step = e.step(), "Scheduled run failed: {}", e);
                        }
                    }
                })
            })
            .with_context(|| format!("invalid cron expression '{}'", self.schedule.cron))?;

            scheduler.add(job).await?;
        }

        scheduler.start().await?;

        info!("Chain scheduler started successfully");
        Ok(scheduler)
    }

    /// Runs every ticker once, immediately and in order.
    ///
    /// A failing ticker does not stop the ones after it.
    pub async fn run_once(&self) -> Vec<TickerOutcome> {
        self.run_tickers(&self.tickers).await
    }

    /// Runs the given tickers once, immediately and in order.
    pub async fn run_tickers(&self, tickers: &[Ticker]) -> Vec<TickerOutcome> {
        let policy = RetryPolicy::from(&self.schedule);
        let mut outcomes = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let result = run_with_retries(&self.pipeline, ticker, policy).await;
            if let Err(e) = &result {
                error!(ticker = %ticker, step = e.step(), "Run failed: {}", e);
            }
            outcomes.push(TickerOutcome {
                ticker: ticker.clone(),
                result,
            });
        }

        outcomes
    }
}
