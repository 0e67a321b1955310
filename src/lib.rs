//! Catalog-Harvest: a paginated content catalog flattener
//!
//! This crate resolves every resource listed under a catalog category, drives
//! full pagination over each resource concurrently, normalizes the returned
//! items into fixed-shape rows, and appends them to a tabular sink while
//! keeping a running total.

pub mod catalog;
pub mod config;
pub mod harvest;
pub mod sink;
pub mod state;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Category resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No API key configured (set [api] api-key or the API_KEY environment variable)")]
    MissingApiKey,

    #[error("Date Not Valid: '{0}'")]
    InvalidDate(String),
}

/// Failure of a single page request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    #[error("API error from {url}: {message}")]
    Api { url: String, message: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid endpoint URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(u32),
}

/// Failure to enumerate the resources of a category
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Catalog page {page} for '{category}' failed: {source}")]
    Fetch {
        category: String,
        page: u32,
        source: FetchError,
    },

    #[error("Resolution of '{0}' was cancelled")]
    Cancelled(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use catalog::{ContentItem, Page, ResourceEndpoint, Row, TagItem};
pub use config::Config;
pub use harvest::{Coordinator, RunSummary};
pub use sink::{Aggregator, RowSink};
pub use state::ResourceState;
