//! Harvest module for catalog resolution and resource collection
//!
//! This module contains the core harvesting logic, including:
//! - Page fetching against the catalog and content endpoints
//! - Resolving a category into its resource endpoints
//! - Paginating each resource under the throttled or eager strategy
//! - Overall run coordination and the end-of-run summary

mod collector;
mod coordinator;
mod fetcher;
mod resolver;
mod summary;


pub use collector::{CollectError, CollectorSettings, Outcome, ResourceCollector};
pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{build_http_client, HttpPageFetcher, PageFetcher};
pub use resolver::CategoryResolver;
pub use summary::{print_summary, RunSummary};
