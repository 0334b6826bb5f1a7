//! Join of a live catalog page with the premium overlay.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, instrument};

use premier_catalog::{CatalogError, CatalogGateway, CatalogItem, CatalogPage, DEFAULT_PAGE_SIZE};
use premier_core::{DomainError, ProductId};

use crate::filter::ListingFilter;
use crate::record::{PremiumAttributes, PremiumRecord};
use crate::store::{OverlayStore, OverlayStoreError};

/// Image shown for catalog items that have no featured image.
pub const DEFAULT_IMAGE_URL: &str = "https://cdn-icons-png.flaticon.com/512/8136/8136031.png";

/// Default bound on a single catalog fetch.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// A catalog item with premium membership joined in.
///
/// `image` and `price` are display values: they fall back to
/// [`DEFAULT_IMAGE_URL`] and an empty string when the catalog omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedItem {
    pub item: CatalogItem,
    pub image: String,
    pub price: String,
    pub is_premium: bool,
}

impl AnnotatedItem {
    pub fn new(item: CatalogItem, is_premium: bool) -> Self {
        let image = item
            .image_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_URL)
            .to_string();
        let price = item.price.as_ref().map(|p| p.display()).unwrap_or_default();
        Self {
            item,
            image,
            price,
            is_premium,
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.item.id
    }

    /// Display attributes to store when this item gets marked premium.
    pub fn premium_attributes(&self) -> Result<PremiumAttributes, DomainError> {
        PremiumAttributes::new(self.image.clone(), self.item.title.clone(), self.price.clone())
    }
}

/// Annotate each item of `page` with membership in `premium_ids`.
///
/// Catalog order is preserved and no item is ever dropped. Overlay ids that do
/// not appear in the page are simply never matched.
pub fn annotate(page: CatalogPage, premium_ids: &HashSet<ProductId>) -> Vec<AnnotatedItem> {
    page.into_iter()
        .map(|item| {
            let is_premium = premium_ids.contains(&item.id);
            AnnotatedItem::new(item, is_premium)
        })
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error(transparent)]
    Upstream(#[from] CatalogError),

    #[error("overlay read failed: {0}")]
    Storage(#[from] OverlayStoreError),
}

/// Read side of the overlay: annotated catalog listings and raw premium listings.
#[derive(Debug, Clone)]
pub struct ListingService<G, S> {
    gateway: G,
    store: S,
    page_size: usize,
    gateway_timeout: Duration,
}

impl<G, S> ListingService<G, S>
where
    G: CatalogGateway,
    S: OverlayStore,
{
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            store,
            page_size: DEFAULT_PAGE_SIZE,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    /// Fetch one catalog page, join the overlay, then apply the caller's filter.
    ///
    /// Any gateway failure (including the timeout) fails the whole listing.
    #[instrument(skip_all, fields(page_size = self.page_size))]
    pub async fn annotated_listing(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<AnnotatedItem>, ListingError> {
        let page = self.fetch_page().await?;

        let premium_ids: HashSet<ProductId> = match self.store.list_all().await {
            Ok(records) => records.into_iter().map(|r| r.id).collect(),
            Err(e) => {
                error!(error = %e, "failed to read premium overlay");
                return Err(e.into());
            }
        };

        debug!(
            catalog_items = page.len(),
            premium_records = premium_ids.len(),
            "joining catalog page with overlay"
        );

        Ok(filter.apply(annotate(page, &premium_ids)))
    }

    /// All premium records, independent of the live catalog.
    ///
    /// Orphaned records (ids the catalog no longer returns) are included.
    pub async fn premium_records(&self) -> Result<Vec<PremiumRecord>, ListingError> {
        self.store.list_all().await.map_err(|e| {
            error!(error = %e, "failed to list premium records");
            ListingError::from(e)
        })
    }

    pub async fn premium_ids(&self) -> Result<Vec<ProductId>, ListingError> {
        self.store.list_ids().await.map_err(|e| {
            error!(error = %e, "failed to list premium ids");
            ListingError::from(e)
        })
    }

    async fn fetch_page(&self) -> Result<CatalogPage, CatalogError> {
        let fetch = self.gateway.fetch_page(self.page_size);
        match tokio::time::timeout(self.gateway_timeout, fetch).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => {
                error!(error = %e, "catalog fetch failed");
                Err(e)
            }
            Err(_elapsed) => {
                error!(timeout_ms = self.gateway_timeout.as_millis() as u64, "catalog fetch timed out");
                Err(CatalogError::upstream(format!(
                    "catalog did not answer within {} ms",
                    self.gateway_timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use premier_catalog::Money;

    use super::*;
    use crate::filter::PremiumFilter;
    use crate::in_memory::InMemoryOverlayStore;
    use crate::mutator::MembershipMutator;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    /// Gateway serving a swappable item list.
    #[derive(Default)]
    struct FakeCatalog {
        items: Mutex<Vec<CatalogItem>>,
    }

    impl FakeCatalog {
        fn with(items: Vec<CatalogItem>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items),
            })
        }

        fn replace(&self, items: Vec<CatalogItem>) {
            *self.items.lock().unwrap() = items;
        }
    }

    #[async_trait::async_trait]
    impl CatalogGateway for FakeCatalog {
        async fn fetch_page(&self, limit: usize) -> Result<CatalogPage, CatalogError> {
            let items = self.items.lock().unwrap();
            Ok(CatalogPage::new(
                items.iter().take(limit).cloned().collect(),
                items.len() > limit,
            ))
        }
    }

    struct DownCatalog;

    #[async_trait::async_trait]
    impl CatalogGateway for DownCatalog {
        async fn fetch_page(&self, _limit: usize) -> Result<CatalogPage, CatalogError> {
            Err(CatalogError::upstream("connection refused"))
        }
    }

    struct SlowCatalog;

    #[async_trait::async_trait]
    impl CatalogGateway for SlowCatalog {
        async fn fetch_page(&self, _limit: usize) -> Result<CatalogPage, CatalogError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(CatalogPage::default())
        }
    }

    fn shirt() -> CatalogItem {
        CatalogItem::new(pid("P1"), "Shirt").with_price(Money::new("10", "USD"))
    }

    #[tokio::test]
    async fn p1_scenario_mark_then_unmark() {
        let store = Arc::new(InMemoryOverlayStore::new());
        let listing = ListingService::new(FakeCatalog::with(vec![shirt()]), store.clone());
        let mutator = MembershipMutator::new(store);
        let all = ListingFilter::default();

        let items = listing.annotated_listing(&all).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id().as_str(), "P1");
        assert!(!items[0].is_premium);

        let attrs = PremiumAttributes::new("img.png", "Shirt", "10USD").unwrap();
        mutator.mark_premium(pid("P1"), attrs).await.unwrap();
        let items = listing.annotated_listing(&all).await.unwrap();
        assert!(items[0].is_premium);

        mutator.unmark_premium(&pid("P1")).await.unwrap();
        let items = listing.annotated_listing(&all).await.unwrap();
        assert!(!items[0].is_premium);
        assert!(listing.premium_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_image_and_price_get_placeholders() {
        let bare = CatalogItem::new(pid("P2"), "Bare");
        let listing = ListingService::new(
            FakeCatalog::with(vec![shirt(), bare]),
            InMemoryOverlayStore::new(),
        );

        let items = listing.annotated_listing(&ListingFilter::default()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, "10USD");
        assert_eq!(items[1].image, DEFAULT_IMAGE_URL);
        assert_eq!(items[1].price, "");
    }

    #[tokio::test]
    async fn orphaned_records_only_show_in_premium_listing() {
        let catalog = FakeCatalog::with(vec![shirt(), CatalogItem::new(pid("P2"), "Hat")]);
        let store = Arc::new(InMemoryOverlayStore::new());
        let listing = ListingService::new(catalog.clone(), store.clone());
        let mutator = MembershipMutator::new(store);

        let attrs = PremiumAttributes::new("", "Hat", "").unwrap();
        mutator.mark_premium(pid("P2"), attrs).await.unwrap();

        // P2 disappears from the catalog.
        catalog.replace(vec![shirt()]);

        let items = listing.annotated_listing(&ListingFilter::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|i| i.id().as_str() != "P2"));

        let premium = listing.premium_records().await.unwrap();
        assert_eq!(premium.len(), 1);
        assert_eq!(premium[0].id, pid("P2"));
        assert_eq!(listing.premium_ids().await.unwrap(), vec![pid("P2")]);
    }

    #[tokio::test]
    async fn page_size_bounds_the_listing() {
        let items: Vec<_> = (0..10)
            .map(|i| CatalogItem::new(pid(&format!("P{i}")), "x"))
            .collect();
        let listing =
            ListingService::new(FakeCatalog::with(items), InMemoryOverlayStore::new()).with_page_size(3);
        assert_eq!(listing.annotated_listing(&ListingFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn gateway_failure_fails_the_listing() {
        let listing = ListingService::new(DownCatalog, InMemoryOverlayStore::new());
        let err = listing.annotated_listing(&ListingFilter::default()).await.unwrap_err();
        assert!(matches!(err, ListingError::Upstream(CatalogError::UpstreamUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_gateway_times_out_as_upstream_unavailable() {
        let listing = ListingService::new(SlowCatalog, InMemoryOverlayStore::new())
            .with_gateway_timeout(Duration::from_millis(50));
        let err = listing.annotated_listing(&ListingFilter::default()).await.unwrap_err();
        assert!(matches!(err, ListingError::Upstream(CatalogError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn filter_is_applied_after_the_join() {
        let catalog = FakeCatalog::with(vec![
            shirt(),
            CatalogItem::new(pid("P2"), "Blue Shirt"),
            CatalogItem::new(pid("P3"), "Hat"),
        ]);
        let store = Arc::new(InMemoryOverlayStore::new());
        let listing = ListingService::new(catalog, store.clone());
        MembershipMutator::new(store)
            .mark_premium(pid("P2"), PremiumAttributes::new("", "Blue Shirt", "").unwrap())
            .await
            .unwrap();

        let filter = ListingFilter::new(Some("shirt".into()), PremiumFilter::Normal);
        let items = listing.annotated_listing(&filter).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["P1"]);
    }

    #[test]
    fn premium_attributes_follow_display_values() {
        let annotated = AnnotatedItem::new(CatalogItem::new(pid("P9"), "Mug"), false);
        let attrs = annotated.premium_attributes().unwrap();
        assert_eq!(attrs.image_url(), DEFAULT_IMAGE_URL);
        assert_eq!(attrs.title(), "Mug");
        assert_eq!(attrs.price_display(), "");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: membership in the listing equals membership in the overlay.
            #[test]
            fn is_premium_matches_overlay(
                catalog_ids in proptest::collection::btree_set("[A-Z][0-9]{1,3}", 0..40),
                overlay_ids in proptest::collection::btree_set("[A-Z][0-9]{1,3}", 0..40),
            ) {
                let page = CatalogPage::new(
                    catalog_ids.iter().map(|i| CatalogItem::new(pid(i), i.clone())).collect(),
                    false,
                );
                let overlay: HashSet<ProductId> = overlay_ids.iter().map(|i| pid(i)).collect();

                let annotated = annotate(page, &overlay);

                prop_assert_eq!(annotated.len(), catalog_ids.len());
                for (a, expected_id) in annotated.iter().zip(catalog_ids.iter()) {
                    prop_assert_eq!(a.id().as_str(), expected_id.as_str());
                    prop_assert_eq!(a.is_premium, overlay_ids.contains(expected_id));
                }
            }
        }
    }
}
