//! Caller-owned view-model for narrowing an annotated listing.

use core::str::FromStr;

use premier_core::DomainError;

use crate::listing::AnnotatedItem;

/// Which side of the premium flag to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PremiumFilter {
    #[default]
    All,
    Premium,
    Normal,
}

impl PremiumFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumFilter::All => "all",
            PremiumFilter::Premium => "premium",
            PremiumFilter::Normal => "normal",
        }
    }

    fn admits(&self, is_premium: bool) -> bool {
        match self {
            PremiumFilter::All => true,
            PremiumFilter::Premium => is_premium,
            PremiumFilter::Normal => !is_premium,
        }
    }
}

impl FromStr for PremiumFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(PremiumFilter::All),
            "premium" => Ok(PremiumFilter::Premium),
            "normal" => Ok(PremiumFilter::Normal),
            other => Err(DomainError::validation(format!(
                "show must be one of: all, premium, normal (got {other:?})"
            ))),
        }
    }
}

/// Title search plus premium/normal selector.
///
/// Applied after the join; it only drops items, it never changes flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingFilter {
    query: Option<String>,
    show: PremiumFilter,
}

impl ListingFilter {
    pub fn new(query: Option<String>, show: PremiumFilter) -> Self {
        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        Self { query, show }
    }

    pub fn show(&self) -> PremiumFilter {
        self.show
    }

    pub fn matches(&self, item: &AnnotatedItem) -> bool {
        let title_ok = match &self.query {
            Some(q) => item.item.title.to_lowercase().contains(q.as_str()),
            None => true,
        };
        title_ok && self.show.admits(item.is_premium)
    }

    pub fn apply(&self, items: Vec<AnnotatedItem>) -> Vec<AnnotatedItem> {
        if self.query.is_none() && self.show == PremiumFilter::All {
            return items;
        }
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use premier_catalog::CatalogItem;
    use premier_core::ProductId;

    use super::*;

    fn annotated(id: &str, title: &str, premium: bool) -> AnnotatedItem {
        AnnotatedItem::new(CatalogItem::new(ProductId::new(id).unwrap(), title), premium)
    }

    #[test]
    fn parses_show_values() {
        assert_eq!("premium".parse::<PremiumFilter>().unwrap(), PremiumFilter::Premium);
        assert_eq!("NORMAL".parse::<PremiumFilter>().unwrap(), PremiumFilter::Normal);
        assert_eq!("".parse::<PremiumFilter>().unwrap(), PremiumFilter::All);
        assert!("gold".parse::<PremiumFilter>().is_err());
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let f = ListingFilter::new(Some("  SHIRT ".into()), PremiumFilter::All);
        assert!(f.matches(&annotated("P1", "Blue shirt", false)));
        assert!(!f.matches(&annotated("P2", "Hat", true)));
    }

    #[test]
    fn show_selects_by_flag() {
        let items = vec![
            annotated("P1", "a", true),
            annotated("P2", "b", false),
            annotated("P3", "c", true),
        ];

        let premium = ListingFilter::new(None, PremiumFilter::Premium).apply(items.clone());
        assert_eq!(premium.len(), 2);
        assert!(premium.iter().all(|i| i.is_premium));

        let normal = ListingFilter::new(None, PremiumFilter::Normal).apply(items.clone());
        assert_eq!(normal.len(), 1);
        assert_eq!(normal[0].id().as_str(), "P2");

        assert_eq!(ListingFilter::default().apply(items.clone()), items);
    }
}
