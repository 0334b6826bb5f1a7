use chrono::{DateTime, Utc};

use premier_core::{DomainError, ProductId};

/// Display attributes captured when an item is marked premium.
///
/// These are a snapshot taken at mark time; they are not kept in sync with
/// the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumAttributes {
    image_url: String,
    title: String,
    price_display: String,
}

impl PremiumAttributes {
    /// Validate and build display attributes.
    ///
    /// `title` must not be blank; `image_url` and `price_display` may be empty.
    pub fn new(
        image_url: impl Into<String>,
        title: impl Into<String>,
        price_display: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title must not be blank"));
        }

        Ok(Self {
            image_url: image_url.into().trim().to_string(),
            title: title.trim().to_string(),
            price_display: price_display.into().trim().to_string(),
        })
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price_display(&self) -> &str {
        &self.price_display
    }
}

/// A persisted premium-membership record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumRecord {
    pub id: ProductId,
    pub attributes: PremiumAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PremiumRecord {
    /// Fresh record with `created_at == updated_at == now`.
    pub fn created(id: ProductId, attributes: PremiumAttributes, now: DateTime<Utc>) -> Self {
        Self {
            id,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply new attributes. `updated_at` only moves when something changed,
    /// so replaying the same attributes leaves the record byte-for-byte equal.
    pub fn refreshed(mut self, attributes: PremiumAttributes, now: DateTime<Utc>) -> Self {
        if self.attributes != attributes {
            self.attributes = attributes;
            self.updated_at = now;
        }
        self
    }

    /// Always `true`: a record only exists for premium items.
    pub fn is_premium(&self) -> bool {
        true
    }

    pub fn image_url(&self) -> &str {
        self.attributes.image_url()
    }

    pub fn title(&self) -> &str {
        self.attributes.title()
    }

    pub fn price_display(&self) -> &str {
        self.attributes.price_display()
    }
}

/// Premium membership of a single product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Member(PremiumRecord),
    NotMember,
}

impl Membership {
    pub fn is_member(&self) -> bool {
        matches!(self, Membership::Member(_))
    }

    pub fn record(&self) -> Option<&PremiumRecord> {
        match self {
            Membership::Member(r) => Some(r),
            Membership::NotMember => None,
        }
    }
}

impl From<Option<PremiumRecord>> for Membership {
    fn from(value: Option<PremiumRecord>) -> Self {
        match value {
            Some(r) => Membership::Member(r),
            None => Membership::NotMember,
        }
    }
}
