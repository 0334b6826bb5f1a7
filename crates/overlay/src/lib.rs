//! Premium-membership overlay.
//!
//! A sparse, locally-owned set of [`PremiumRecord`]s keyed by catalog
//! [`ProductId`](premier_core::ProductId). A record's presence *is* the premium
//! flag. This crate holds the overlay model, the [`OverlayStore`] contract
//! (plus an in-memory implementation), the mark/unmark [`MembershipMutator`],
//! and the join that annotates live catalog pages with membership.

pub mod filter;
pub mod in_memory;
pub mod listing;
pub mod mutator;
pub mod record;
pub mod store;

pub use filter::{ListingFilter, PremiumFilter};
pub use in_memory::InMemoryOverlayStore;
pub use listing::{annotate, AnnotatedItem, ListingError, ListingService, DEFAULT_IMAGE_URL};
pub use mutator::{MembershipError, MembershipMutator};
pub use record::{Membership, PremiumAttributes, PremiumRecord};
pub use store::{OverlayStore, OverlayStoreError};
