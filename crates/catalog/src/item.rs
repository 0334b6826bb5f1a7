use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use premier_core::ProductId;

/// A price as reported by the catalog.
///
/// The amount is kept as the catalog's decimal string (e.g. `"10.0"`) so the
/// display form matches what the merchant sees upstream. No arithmetic is done
/// on it here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String, // ISO currency code (e.g. "USD")
}

impl Money {
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Compact display form: amount immediately followed by the currency code (`10USD`).
    pub fn display(&self) -> String {
        format!("{}{}", self.amount, self.currency_code)
    }
}

/// A product as seen in the external catalog (read-only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub stock_count: Option<i64>,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl CatalogItem {
    /// Minimal item with only the required fields set.
    pub fn new(id: ProductId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            image_url: None,
            image_alt: None,
            price: None,
            stock_count: None,
            vendor: String::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock_count = Some(stock);
        self
    }
}
