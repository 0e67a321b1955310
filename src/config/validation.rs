use crate::config::types::{ApiConfig, Config, HarvestConfig, OutputConfig};
use crate::ConfigError;
use chrono::{DateTime, NaiveDate};
use url::Url;

/// Validates the entire configuration
///
/// The API key is checked separately by [`require_api_key`] because it may
/// still arrive from the environment after the file is loaded.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_harvest_config(&config.harvest)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates remote API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.catalog_page_size < 1 || config.catalog_page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "catalog-page-size must be between 1 and 1000, got {}",
            config.catalog_page_size
        )));
    }

    if config.content_page_size < 1 || config.content_page_size > 200 {
        return Err(ConfigError::Validation(format!(
            "content-page-size must be between 1 and 200, got {}",
            config.content_page_size
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates collection behavior configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.tick_interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "tick-interval-ms must be >= 1ms, got {}ms",
            config.tick_interval_ms
        )));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 64, got {}",
            config.max_concurrent_pages
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Returns the configured API key, or `MissingApiKey`
pub fn require_api_key(config: &Config) -> Result<&str, ConfigError> {
    match config.api.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// Parses the start date given on the command line
///
/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp, whose
/// date part is kept.
pub fn parse_start_date(input: &str) -> Result<NaiveDate, ConfigError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ConfigError::InvalidDate(input.to_string()))
}
