use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default catalog API root
pub const DEFAULT_BASE_URL: &str = "https://content.guardianapis.com";

/// Main configuration structure for Catalog-Harvest
///
/// Every section is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Root URL; the catalog lives at `{base-url}/tags`
    pub base_url: String,

    /// API key sent as `api-key` on every request
    pub api_key: Option<String>,

    /// `page-size` for catalog requests
    pub catalog_page_size: u32,

    /// `page-size` for content requests
    pub content_page_size: u32,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            catalog_page_size: 50,
            content_page_size: 100,
            timeout_secs: 30,
        }
    }
}

/// Collection behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HarvestConfig {
    /// How each resource paginates
    pub strategy: HarvestStrategy,

    /// Pause between page fetches of one resource under the throttled strategy (milliseconds)
    pub tick_interval_ms: u64,

    /// Width of the per-resource fetch pool under the eager strategy
    pub max_concurrent_pages: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            strategy: HarvestStrategy::Throttled,
            tick_interval_ms: 500,
            max_concurrent_pages: 8,
        }
    }
}

impl HarvestConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the output file
    pub path: String,

    /// Output format; inferred from the path when absent
    pub format: Option<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./file.csv".to_string(),
            format: None,
        }
    }
}

impl OutputConfig {
    /// The configured format, or the one implied by the file extension
    pub fn resolved_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(Path::new(&self.path)))
    }
}

/// Pagination strategy for a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestStrategy {
    /// One page per tick, pages of a resource fetched in order
    Throttled,

    /// All remaining pages fetched at once through a bounded pool
    Eager,
}

impl FromStr for HarvestStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "throttled" => Ok(Self::Throttled),
            "eager" => Ok(Self::Eager),
            other => Err(format!(
                "unknown strategy '{}', expected 'throttled' or 'eager'",
                other
            )),
        }
    }
}

impl fmt::Display for HarvestStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Throttled => f.write_str("throttled"),
            Self::Eager => f.write_str("eager"),
        }
    }
}

/// Tabular output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Sqlite,
}

impl OutputFormat {
    /// `.db`, `.sqlite` and `.sqlite3` select SQLite; anything else is CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("db") | Some("sqlite") | Some("sqlite3") => Self::Sqlite,
            _ => Self::Csv,
        }
    }
}
