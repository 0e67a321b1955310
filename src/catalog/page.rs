//! Paginated response envelope
//!
//! Every endpoint answers with `{"response": {...}}`. The inner object carries
//! the application status, the pagination metadata and the result items.

use crate::FetchError;
use serde::Deserialize;

/// One fetched page of items
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items returned on this page
    pub items: Vec<T>,

    /// Index of this page (1-based)
    pub current_page: u32,

    /// Number of pages the endpoint reports; only trusted from page 1
    pub total_pages: u32,

    /// Total number of items across all pages, when reported
    pub total: Option<u64>,
}

/// Outer JSON envelope
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: Option<ApiResponse<T>>,
}

/// Inner response object
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub pages: Option<u32>,

    #[serde(default)]
    pub current_page: Option<u32>,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> ApiEnvelope<T> {
    /// Converts the decoded envelope into a `Page`
    ///
    /// # Arguments
    ///
    /// * `url` - The request URL, used in error messages
    /// * `requested_page` - The page number that was requested
    ///
    /// # Returns
    ///
    /// * `Ok(Page<T>)` - The response carried a usable page
    /// * `Err(FetchError)` - The envelope was missing or reported an error
    pub fn into_page(self, url: &str, requested_page: u32) -> Result<Page<T>, FetchError> {
        let response = self.response.ok_or_else(|| FetchError::EmptyBody {
            url: url.to_string(),
        })?;

        if response.status.as_deref() == Some("error") {
            return Err(FetchError::Api {
                url: url.to_string(),
                message: response
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        // An endpoint that omits `pages` is treated as a single page
        let total_pages = response.pages.unwrap_or(1);

        Ok(Page {
            items: response.results,
            current_page: response.current_page.unwrap_or(requested_page),
            total_pages,
            total: response.total,
        })
    }
}
