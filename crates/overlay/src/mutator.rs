use thiserror::Error;
use tracing::{error, info, instrument};

use premier_core::ProductId;

use crate::record::{Membership, PremiumAttributes, PremiumRecord};
use crate::store::{OverlayStore, OverlayStoreError};

/// Mark/unmark failure as seen by callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The product has no premium record.
    #[error("product {0} is not in the premium list")]
    NotFound(ProductId),

    /// The overlay store failed; the prior state is unchanged.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<OverlayStoreError> for MembershipError {
    fn from(value: OverlayStoreError) -> Self {
        match value {
            OverlayStoreError::NotFound(id) => MembershipError::NotFound(id),
            OverlayStoreError::Storage(msg) => MembershipError::Storage(msg),
        }
    }
}

/// Mark/unmark operations over an [`OverlayStore`].
///
/// Membership is two-state (present/absent) with direct transitions; there is
/// no ordering between mark and unmark beyond last-writer-wins in the store.
#[derive(Debug, Clone)]
pub struct MembershipMutator<S> {
    store: S,
}

impl<S> MembershipMutator<S>
where
    S: OverlayStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Flag `id` as premium, creating or refreshing its record.
    ///
    /// The id is not checked against the live catalog.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn mark_premium(
        &self,
        id: ProductId,
        attributes: PremiumAttributes,
    ) -> Result<PremiumRecord, MembershipError> {
        match self.store.upsert(id, attributes).await {
            Ok(record) => {
                info!("product marked as premium");
                Ok(record)
            }
            Err(e) => {
                error!(error = %e, "failed to mark product as premium");
                Err(e.into())
            }
        }
    }

    /// Remove `id` from the premium list, returning the removed record.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn unmark_premium(&self, id: &ProductId) -> Result<PremiumRecord, MembershipError> {
        let record = match self.membership(id).await? {
            Membership::Member(record) => record,
            Membership::NotMember => return Err(MembershipError::NotFound(id.clone())),
        };

        // A concurrent unmark may win between the check and the delete; the
        // store then reports NotFound, which maps to the same domain error.
        if let Err(e) = self.store.delete(id).await {
            if let OverlayStoreError::Storage(_) = e {
                error!(error = %e, "failed to remove product from premium list");
            }
            return Err(e.into());
        }

        info!("product removed from premium list");
        Ok(record)
    }

    pub async fn membership(&self, id: &ProductId) -> Result<Membership, MembershipError> {
        match self.store.get(id).await {
            Ok(found) => Ok(Membership::from(found)),
            Err(e) => {
                error!(product_id = %id, error = %e, "failed to read premium record");
                Err(e.into())
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
