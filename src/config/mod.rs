//! Configuration module for Catalog-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus the API key fallback and start date parsing.
//!
//! # Example
//!
//! ```no_run
//! use catalog_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pacing: {}ms", config.harvest.tick_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, HarvestConfig, HarvestStrategy, OutputConfig, OutputFormat,
    DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{
    apply_api_key_fallback, compute_config_hash, hash_content, load_config,
    load_config_with_hash, parse_config, resolve_api_key_from_env, API_KEY_ENV,
};

pub use validation::{parse_start_date, require_api_key, validate};
