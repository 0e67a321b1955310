//! Category resolution
//!
//! Enumerates every resource endpoint listed under a category by paginating
//! the catalog (tags) endpoint.

use crate::catalog::ResourceEndpoint;
use crate::harvest::PageFetcher;
use crate::ResolutionError;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Resolves a category name into its resource endpoints
pub struct CategoryResolver {
    fetcher: Arc<dyn PageFetcher>,
    cancel: CancellationToken,
}

impl CategoryResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cancel: CancellationToken) -> Self {
        Self { fetcher, cancel }
    }

    /// Lists every resource endpoint of `category`
    ///
    /// Page 1 is fetched first to learn the page count; pages 2..=N are then
    /// requested all at once. The result order is unspecified.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ResourceEndpoint>)` - One endpoint per catalog item
    /// * `Err(ResolutionError)` - Any catalog page failed, or the run was cancelled
    pub async fn resolve_resources(
        &self,
        category: &str,
    ) -> Result<Vec<ResourceEndpoint>, ResolutionError> {
        if self.cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled(category.to_string()));
        }

        let first = self
            .fetcher
            .fetch_catalog_page(category, 1)
            .await
            .map_err(|source| ResolutionError::Fetch {
                category: category.to_string(),
                page: 1,
                source,
            })?;

        let total_pages = first.total_pages;
        tracing::debug!(
            "Catalog for '{}' reports {} pages ({} items on page 1)",
            category,
            total_pages,
            first.items.len()
        );

        let mut items = first.items;

        if total_pages > 1 {
            if self.cancel.is_cancelled() {
                return Err(ResolutionError::Cancelled(category.to_string()));
            }

            let fetcher = &self.fetcher;
            let remaining = (2..=total_pages).map(|page| async move {
                fetcher
                    .fetch_catalog_page(category, page)
                    .await
                    .map_err(|source| ResolutionError::Fetch {
                        category: category.to_string(),
                        page,
                        source,
                    })
            });

            for page in try_join_all(remaining).await? {
                items.extend(page.items);
            }
        }

        Ok(items.into_iter().map(ResourceEndpoint::from).collect())
    }
}
