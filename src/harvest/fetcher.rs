//! HTTP page fetcher
//!
//! This module handles every request made against the catalog API:
//! - Building the HTTP client
//! - Issuing one paginated GET and decoding the response envelope
//! - Classifying failures (transport, HTTP status, empty body, API error)
//!
//! No retries are performed here; a failed call is returned to the caller
//! immediately.

use crate::catalog::{ApiEnvelope, ContentItem, Page, ResourceEndpoint, TagItem};
use crate::config::ApiConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Source of catalog and content pages
///
/// `HttpPageFetcher` is the production implementation; tests substitute
/// scripted fetchers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page of the tag listing for `category`
    async fn fetch_catalog_page(&self, category: &str, page: u32) -> FetchResult<Page<TagItem>>;

    /// Fetches one page of `endpoint`, restricted to items published on or after `from_date`
    async fn fetch_content_page(
        &self,
        endpoint: &ResourceEndpoint,
        from_date: NaiveDate,
        page: u32,
    ) -> FetchResult<Page<ContentItem>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The API configuration (timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by reqwest
pub struct HttpPageFetcher {
    client: Client,
    tags_url: String,
    api_key: String,
    catalog_page_size: u32,
    content_page_size: u32,
}

impl HttpPageFetcher {
    /// Creates a fetcher for the API described by `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, page sizes and timeouts
    /// * `api_key` - Key sent as `api-key` on every request
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            tags_url: format!("{}/tags", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            catalog_page_size: config.catalog_page_size,
            content_page_size: config.content_page_size,
        })
    }

    /// URL of the catalog (tags) endpoint
    pub fn tags_url(&self) -> &str {
        &self.tags_url
    }

    /// Issues one paginated GET against `endpoint`
    ///
    /// # Request Flow
    ///
    /// 1. Reject page numbers below 1
    /// 2. Append `api-key`, `params` and `page` to the query string
    /// 3. Send the request; a non-2xx status is a failure
    /// 4. Decode the `{"response": ...}` envelope; an empty body, a missing
    ///    envelope or `status: "error"` is a failure
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Endpoint URL without the query string parameters below
    /// * `params` - Endpoint-specific filters
    /// * `page` - Page number, starting at 1
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        page: u32,
    ) -> FetchResult<Page<T>> {
        if page < 1 {
            return Err(FetchError::InvalidPage(page));
        }

        let mut url = Url::parse(endpoint).map_err(|source| FetchError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-key", &self.api_key);
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("page", &page.to_string());
        }

        tracing::trace!("GET {} page {}", endpoint, page);

        // Errors carry `endpoint`, never `url`, so the API key stays out of logs
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: endpoint.to_string(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: endpoint.to_string(),
            source: source.without_url(),
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: endpoint.to_string(),
            });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: endpoint.to_string(),
                source,
            })?;

        envelope.into_page(endpoint, page)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_catalog_page(&self, category: &str, page: u32) -> FetchResult<Page<TagItem>> {
        let params = [
            ("type", "keyword".to_string()),
            ("section", category.to_string()),
            ("page-size", self.catalog_page_size.to_string()),
        ];
        self.fetch(&self.tags_url, &params, page).await
    }

    async fn fetch_content_page(
        &self,
        endpoint: &ResourceEndpoint,
        from_date: NaiveDate,
        page: u32,
    ) -> FetchResult<Page<ContentItem>> {
        let params = [
            ("show-fields", "all".to_string()),
            ("page-size", self.content_page_size.to_string()),
            ("from-date", from_date.format("%Y-%m-%d").to_string()),
        ];
        self.fetch(endpoint.as_str(), &params, page).await
    }
}
