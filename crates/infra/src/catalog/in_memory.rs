use std::sync::{PoisonError, RwLock};

use premier_catalog::{CatalogError, CatalogGateway, CatalogItem, CatalogPage, Money};
use premier_core::ProductId;

/// In-memory catalog for tests/dev.
///
/// The item list can be replaced at runtime to simulate catalog drift.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<Vec<CatalogItem>>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Small fixed catalog used when no upstream shop is configured.
    pub fn demo() -> Self {
        let mut items = Vec::new();
        let seed: [(&str, &str, Option<(&str, &str)>, Option<&str>, i64); 4] = [
            ("gid://demo/Product/1", "Classic Shirt", Some(("10.0", "USD")), Some("https://picsum.photos/seed/shirt/240"), 25),
            ("gid://demo/Product/2", "Canvas Tote", Some(("18.5", "USD")), None, 4),
            ("gid://demo/Product/3", "Gift Card", None, None, 0),
            ("gid://demo/Product/4", "Wool Beanie", Some(("12.0", "USD")), Some("https://picsum.photos/seed/beanie/240"), 11),
        ];
        for (id, title, price, image, stock) in seed {
            let Ok(id) = ProductId::new(id) else { continue };
            let mut item = CatalogItem::new(id, title).with_stock(stock);
            item.vendor = "Demo Supply Co.".to_string();
            if let Some((amount, currency)) = price {
                item = item.with_price(Money::new(amount, currency));
            }
            if let Some(url) = image {
                item = item.with_image(url);
            }
            items.push(item);
        }
        Self::new(items)
    }

    /// Swap the whole item list. A poisoned lock is recovered and cleared,
    /// since the new list fully replaces whatever state it guarded.
    pub fn replace(&self, items: Vec<CatalogItem>) {
        let mut guard = self.items.write().unwrap_or_else(PoisonError::into_inner);
        *guard = items;
        drop(guard);
        self.items.clear_poison();
    }
}

#[async_trait::async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn fetch_page(&self, limit: usize) -> Result<CatalogPage, CatalogError> {
        let items = self
            .items
            .read()
            .map_err(|_| CatalogError::upstream("in-memory catalog lock poisoned"))?;
        let page: Vec<_> = items.iter().take(limit).cloned().collect();
        Ok(CatalogPage::new(page, items.len() > limit))
    }
}
