use std::sync::Arc;

use thiserror::Error;

use crate::item::CatalogItem;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page the upstream Admin API accepts in one request.
pub const MAX_PAGE_SIZE: usize = 250;

/// Catalog access failure.
///
/// Every upstream failure (unreachable, timed out, non-success status, GraphQL
/// errors, malformed payload) collapses into one variant: callers treat them
/// identically and fail the current request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl CatalogError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }
}

/// One page of catalog items.
///
/// Consumed by value: iterating hands out the items and the page is gone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogPage {
    items: Vec<CatalogItem>,
    has_next_page: bool,
}

impl CatalogPage {
    pub fn new(items: Vec<CatalogItem>, has_next_page: bool) -> Self {
        Self { items, has_next_page }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the upstream reported more items beyond this page.
    ///
    /// Informational only: cursors are not followed.
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

impl IntoIterator for CatalogPage {
    type Item = CatalogItem;
    type IntoIter = std::vec::IntoIter<CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Read-only accessor over the external catalog.
///
/// Implementations must return at most `limit` items and must never return a
/// partial page on failure.
#[async_trait::async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn fetch_page(&self, limit: usize) -> Result<CatalogPage, CatalogError>;
}

#[async_trait::async_trait]
impl<G> CatalogGateway for Arc<G>
where
    G: CatalogGateway + ?Sized,
{
    async fn fetch_page(&self, limit: usize) -> Result<CatalogPage, CatalogError> {
        (**self).fetch_page(limit).await
    }
}
