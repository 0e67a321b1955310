//! Resource collection
//!
//! A `ResourceCollector` paginates one content endpoint to the end, turns
//! every item into a `Row`, and hands the complete batch to the aggregator.
//! A resource contributes either all of its rows or none of them.
//!
//! # Strategies
//!
//! | Strategy | Page 1 | Pages 2..=N | Flush |
//! |----------|--------|-------------|-------|
//! | Throttled | fetched first | one per tick, in order | once, after page N |
//! | Eager | fetched first | all at once, bounded pool | once, after every page |

use crate::catalog::{normalize_items, ContentItem, Page, ResourceEndpoint, Row};
use crate::config::{HarvestConfig, HarvestStrategy};
use crate::harvest::PageFetcher;
use crate::sink::{Aggregator, SinkError};
use crate::state::ResourceState;
use crate::FetchError;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a resource contributed no rows
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("page {page} failed: {source}")]
    Fetch { page: u32, source: FetchError },

    #[error("flush failed: {0}")]
    Sink(#[from] SinkError),

    #[error("cancelled before completion")]
    Cancelled,

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: ResourceState,
        to: ResourceState,
    },
}

/// Result of a successful collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Rows appended to the sink for this resource
    pub rows_contributed: usize,

    /// Pages retrieved, including page 1
    pub pages_fetched: u32,
}

/// Collector tuning taken from `[harvest]`
#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    pub strategy: HarvestStrategy,
    pub tick_interval: Duration,
    pub max_concurrent_pages: usize,
}

impl From<&HarvestConfig> for CollectorSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            strategy: config.strategy,
            tick_interval: config.tick_interval(),
            max_concurrent_pages: config.max_concurrent_pages.max(1) as usize,
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

/// Tracks one resource through its state machine
struct Progress<'a> {
    endpoint: &'a ResourceEndpoint,
    state: ResourceState,
}

impl<'a> Progress<'a> {
    fn new(endpoint: &'a ResourceEndpoint) -> Self {
        Self {
            endpoint,
            state: ResourceState::Init,
        }
    }

    fn advance(&mut self, next: ResourceState) -> Result<(), CollectError> {
        if !self.state.can_transition_to(next) {
            return Err(CollectError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        if self.state != next {
            tracing::trace!("{}: {} -> {}", self.endpoint, self.state, next);
        }
        self.state = next;
        Ok(())
    }

    fn fail(&mut self) {
        if self.state.can_transition_to(ResourceState::Failed) {
            tracing::trace!("{}: {} -> failed", self.endpoint, self.state);
            self.state = ResourceState::Failed;
        }
    }
}

/// Paginates single resources and flushes their rows
#[derive(Clone)]
pub struct ResourceCollector {
    fetcher: Arc<dyn PageFetcher>,
    aggregator: Arc<Aggregator>,
    settings: CollectorSettings,
    cancel: CancellationToken,
}

impl ResourceCollector {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        aggregator: Arc<Aggregator>,
        settings: CollectorSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            aggregator,
            settings,
            cancel,
        }
    }

    /// Collects every page of `endpoint` published on or after `start_date`
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome)` - All pages were fetched and the batch was appended
    /// * `Err(CollectError)` - Nothing was appended for this resource
    pub async fn collect(
        &self,
        endpoint: &ResourceEndpoint,
        start_date: NaiveDate,
    ) -> Result<Outcome, CollectError> {
        let mut progress = Progress::new(endpoint);

        let result = match self.settings.strategy {
            HarvestStrategy::Throttled => {
                self.collect_throttled(&mut progress, endpoint, start_date)
                    .await
            }
            HarvestStrategy::Eager => {
                self.collect_eager(&mut progress, endpoint, start_date)
                    .await
            }
        };

        if result.is_err() {
            progress.fail();
        }
        result
    }

    /// One page per tick; a resource's pages are fetched strictly in order
    async fn collect_throttled(
        &self,
        progress: &mut Progress<'_>,
        endpoint: &ResourceEndpoint,
        start_date: NaiveDate,
    ) -> Result<Outcome, CollectError> {
        progress.advance(ResourceState::FetchingFirst)?;
        let first = self.fetch(endpoint, start_date, 1).await?;
        let total_pages = first.total_pages;

        progress.advance(ResourceState::Accumulating)?;
        let mut buffer = normalize_items(first.items);
        let mut page = 1;

        while page < total_pages {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(CollectError::Cancelled),
                _ = tokio::time::sleep(self.settings.tick_interval) => {}
            }

            page += 1;
            let next = self.fetch(endpoint, start_date, page).await?;
            buffer.extend(normalize_items(next.items));
            progress.advance(ResourceState::Accumulating)?;
        }

        let rows_contributed = self.flush(progress, buffer)?;
        Ok(Outcome {
            rows_contributed,
            pages_fetched: page,
        })
    }

    /// Pages 2..=N requested together, at most `max_concurrent_pages` in flight
    async fn collect_eager(
        &self,
        progress: &mut Progress<'_>,
        endpoint: &ResourceEndpoint,
        start_date: NaiveDate,
    ) -> Result<Outcome, CollectError> {
        progress.advance(ResourceState::FetchingFirst)?;
        let first = self.fetch(endpoint, start_date, 1).await?;
        let total_pages = first.total_pages;

        progress.advance(ResourceState::Accumulating)?;
        let mut buffer = normalize_items(first.items);

        if total_pages > 1 {
            // `buffered` keeps page order in the output
            let rest: Vec<Page<ContentItem>> = stream::iter(2..=total_pages)
                .map(|page| self.fetch(endpoint, start_date, page))
                .buffered(self.settings.max_concurrent_pages)
                .try_collect()
                .await?;

            for page in rest {
                buffer.extend(normalize_items(page.items));
            }
        }

        let rows_contributed = self.flush(progress, buffer)?;
        Ok(Outcome {
            rows_contributed,
            pages_fetched: total_pages.max(1),
        })
    }

    /// Fetches one page unless the run has been cancelled
    async fn fetch(
        &self,
        endpoint: &ResourceEndpoint,
        start_date: NaiveDate,
        page: u32,
    ) -> Result<Page<ContentItem>, CollectError> {
        if self.cancel.is_cancelled() {
            return Err(CollectError::Cancelled);
        }

        self.fetcher
            .fetch_content_page(endpoint, start_date, page)
            .await
            .map_err(|source| CollectError::Fetch { page, source })
    }

    fn flush(&self, progress: &mut Progress<'_>, buffer: Vec<Row>) -> Result<usize, CollectError> {
        progress.advance(ResourceState::Flushing)?;
        let appended = self.aggregator.append(buffer)?;
        progress.advance(ResourceState::Done)?;
        Ok(appended)
    }
}
