use std::sync::Arc;

use anyhow::Context;

use premier_catalog::CatalogGateway;
use premier_infra::catalog::{InMemoryCatalog, ShopifyAdminGateway};
use premier_infra::config::{AppConfig, CatalogConfig, ListingConfig, OverlayStoreConfig};
use premier_infra::overlay_store::PostgresOverlayStore;
use premier_overlay::{InMemoryOverlayStore, ListingService, MembershipMutator, OverlayStore};

pub type SharedGateway = Arc<dyn CatalogGateway>;
pub type SharedStore = Arc<dyn OverlayStore>;

/// Services shared by every handler.
///
/// The listing service and the mutator hold the same overlay store.
pub struct AppServices {
    pub listing: ListingService<SharedGateway, SharedStore>,
    pub membership: MembershipMutator<SharedStore>,
}

impl AppServices {
    pub fn new(gateway: SharedGateway, store: SharedStore, listing: ListingConfig) -> Self {
        Self {
            listing: ListingService::new(gateway, store.clone())
                .with_page_size(listing.page_size)
                .with_gateway_timeout(listing.gateway_timeout),
            membership: MembershipMutator::new(store),
        }
    }

    /// Demo catalog plus an empty in-memory overlay.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCatalog::demo()),
            Arc::new(InMemoryOverlayStore::new()),
            ListingConfig::default(),
        )
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.overlay_store {
        OverlayStoreConfig::Postgres { database_url } => {
            let store = PostgresOverlayStore::connect(database_url)
                .await
                .context("failed to open premium overlay database")?;
            tracing::info!("using postgres overlay store");
            Arc::new(store)
        }
        OverlayStoreConfig::InMemory => {
            tracing::warn!("USE_PERSISTENT_STORES not enabled; premium flags are kept in memory only");
            Arc::new(InMemoryOverlayStore::new())
        }
    };

    let gateway: SharedGateway = match &config.catalog {
        CatalogConfig::Shopify(shop) => {
            let gateway = ShopifyAdminGateway::new(shop, config.listing.gateway_timeout)
                .context("failed to build catalog client")?;
            tracing::info!(shop = %shop.shop_domain, api_version = %shop.api_version, "using shopify catalog");
            Arc::new(gateway)
        }
        CatalogConfig::Demo => {
            tracing::warn!("SHOPIFY_SHOP_DOMAIN not set; serving the demo catalog");
            Arc::new(InMemoryCatalog::demo())
        }
    };

    Ok(AppServices::new(gateway, store, config.listing))
}
