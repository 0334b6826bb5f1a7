use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use premier_core::{DomainError, ProductId};
use premier_overlay::{AnnotatedItem, ListingFilter, PremiumAttributes, PremiumFilter, PremiumRecord};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct MakePremiumRequest {
    pub id: String,
    #[serde(default)]
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub price: String,
}

impl MakePremiumRequest {
    /// `id` and `title` must be non-blank; `image` and `price` may be empty.
    pub fn validate(self) -> Result<(ProductId, PremiumAttributes), DomainError> {
        let id = ProductId::new(self.id)?;
        let attributes = PremiumAttributes::new(self.image, self.title, self.price)?;
        Ok((id, attributes))
    }
}

#[derive(Debug, Deserialize)]
pub struct RemovePremiumRequest {
    pub id: String,
}

impl RemovePremiumRequest {
    pub fn validate(self) -> Result<ProductId, DomainError> {
        ProductId::new(self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub show: Option<String>,
}

impl ListingQuery {
    pub fn into_filter(self) -> Result<ListingFilter, DomainError> {
        let show = match self.show.as_deref() {
            Some(raw) => raw.parse::<PremiumFilter>()?,
            None => PremiumFilter::All,
        };
        Ok(ListingFilter::new(self.q, show))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedItemDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub image_alt: Option<String>,
    pub price: String,
    pub stock_count: Option<i64>,
    pub vendor: String,
    pub tags: BTreeSet<String>,
    pub is_premium: bool,
}

impl From<AnnotatedItem> for AnnotatedItemDto {
    fn from(value: AnnotatedItem) -> Self {
        let AnnotatedItem {
            item,
            image,
            price,
            is_premium,
        } = value;
        Self {
            id: item.id.into_inner(),
            title: item.title,
            description: item.description,
            image,
            image_alt: item.image_alt,
            price,
            stock_count: item.stock_count,
            vendor: item.vendor,
            tags: item.tags,
            is_premium,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRecordDto {
    pub id: String,
    #[serde(rename = "image")]
    pub image_url: String,
    pub title: String,
    #[serde(rename = "price")]
    pub price_display: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PremiumRecord> for PremiumRecordDto {
    fn from(value: PremiumRecord) -> Self {
        Self {
            is_premium: value.is_premium(),
            image_url: value.image_url().to_string(),
            title: value.title().to_string(),
            price_display: value.price_display().to_string(),
            id: value.id.into_inner(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIdsDto {
    pub premium_product_ids: Vec<String>,
}
