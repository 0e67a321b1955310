//! Harvest coordinator - main run orchestration logic
//!
//! This module wires the pieces of a run together:
//! - Resolving the category into resource endpoints
//! - Spawning one collector task per resource
//! - Reporting per-resource completion and failures
//! - Finalizing the sink and producing the run summary

use crate::catalog::ResourceEndpoint;
use crate::config::{require_api_key, Config};
use crate::harvest::collector::{CollectError, CollectorSettings, Outcome, ResourceCollector};
use crate::harvest::{CategoryResolver, HttpPageFetcher, PageFetcher, RunSummary};
use crate::sink::{open_sink, Aggregator, RowSink, RunMetadata, RunStatus};
use crate::HarvestError;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Main harvest coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    aggregator: Arc<Aggregator>,
    settings: CollectorSettings,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator that talks to the configured API over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration (an API key must be set)
    /// * `sink` - Destination for harvested rows
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Missing API key or HTTP client failure
    pub fn new(config: &Config, sink: Box<dyn RowSink>) -> Result<Self, HarvestError> {
        let api_key = require_api_key(config)?;
        let fetcher = HttpPageFetcher::new(&config.api, api_key)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher), sink))
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        sink: Box<dyn RowSink>,
    ) -> Self {
        Self {
            fetcher,
            aggregator: Arc::new(Aggregator::new(sink)),
            settings: CollectorSettings::from(&config.harvest),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the run's cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Rows appended so far
    pub fn total_rows(&self) -> u64 {
        self.aggregator.total_rows()
    }

    /// Runs one harvest
    ///
    /// 1. Resolve `category` into resource endpoints (failure aborts the run)
    /// 2. Spawn one collector per endpoint
    /// 3. Log each completion or failure as it arrives
    /// 4. Finalize the sink and return the summary
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed; some resources may have failed
    /// * `Err(HarvestError)` - Category resolution failed
    pub async fn run(
        &self,
        category: &str,
        start_date: NaiveDate,
    ) -> Result<RunSummary, HarvestError> {
        let started = Instant::now();
        tracing::info!("--- start crawling --- (category: {})", category);

        let resolver = CategoryResolver::new(Arc::clone(&self.fetcher), self.cancel.clone());
        let endpoints = match resolver.resolve_resources(category).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::error!("{}", e);
                self.finalize(RunStatus::Failed);
                return Err(e.into());
            }
        };

        tracing::info!("Resolved {} resources under '{}'", endpoints.len(), category);
        tracing::info!(
            "-- start to get content --- (strategy: {}, from: {})",
            self.settings.strategy,
            start_date.format("%Y-%m-%d")
        );

        let mut summary = RunSummary::new(category, start_date, endpoints.len());
        let mut tasks = JoinSet::new();

        for endpoint in endpoints {
            let collector = ResourceCollector::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.aggregator),
                self.settings,
                self.cancel.clone(),
            );
            tasks.spawn(async move {
                let result = collector.collect(&endpoint, start_date).await;
                (endpoint, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((endpoint, result)) => self.record(&mut summary, &endpoint, result),
                Err(e) => {
                    tracing::error!("Collector task failed: {}", e);
                    summary.resources_failed += 1;
                }
            }
        }

        summary.total_rows = self.aggregator.total_rows();
        summary.elapsed = started.elapsed();

        let status = if self.cancel.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        self.finalize(status);

        tracing::info!("--- finish {} data ---", summary.total_rows);
        Ok(summary)
    }

    fn record(
        &self,
        summary: &mut RunSummary,
        endpoint: &ResourceEndpoint,
        result: Result<Outcome, CollectError>,
    ) {
        match result {
            Ok(outcome) => {
                tracing::info!(
                    "--- finish {} --- ({} rows, {} pages)",
                    endpoint,
                    outcome.rows_contributed,
                    outcome.pages_fetched
                );
                summary.resources_succeeded += 1;
            }
            Err(CollectError::Cancelled) => {
                tracing::warn!("Abandoned {}: run cancelled", endpoint);
                summary.resources_cancelled += 1;
            }
            Err(e) => {
                tracing::error!("Failed {}: {}", endpoint, e);
                summary.resources_failed += 1;
            }
        }
    }

    fn finalize(&self, status: RunStatus) {
        if let Err(e) = self.aggregator.finalize(status) {
            tracing::error!("Failed to finalize output: {}", e);
        }
    }
}

/// Runs a complete harvest against the configured API and output
///
/// Checks the API key, opens the sink named by `config.output` (appending;
/// clearing a previous run's output is the caller's job), then runs a
/// [`Coordinator`]. A missing key fails before the output is touched.
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::{parse_start_date, Config};
/// use catalog_harvest::harvest::run_harvest;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.api.api_key = Some("test".to_string());
/// let date = parse_start_date("2021-01-01")?;
/// let summary = run_harvest(&config, "business", date, None, CancellationToken::new()).await?;
/// println!("{} rows", summary.total_rows);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    category: &str,
    start_date: NaiveDate,
    config_hash: Option<String>,
    cancel: CancellationToken,
) -> Result<RunSummary, HarvestError> {
    // Nothing is written until the API side is usable
    let api_key = require_api_key(config)?;
    let fetcher = HttpPageFetcher::new(&config.api, api_key)?;

    let metadata = RunMetadata {
        category: category.to_string(),
        start_date: start_date.format("%Y-%m-%d").to_string(),
        config_hash,
    };
    let sink = open_sink(&config.output, &metadata)?;

    Coordinator::with_fetcher(config, Arc::new(fetcher), sink)
        .with_cancellation(cancel)
        .run(category, start_date)
        .await
}
