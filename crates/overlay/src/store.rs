use std::sync::Arc;

use thiserror::Error;

use premier_core::ProductId;

use crate::record::{PremiumAttributes, PremiumRecord};

/// Overlay store operation error.
///
/// `NotFound` is a storage-level signal (deleting an absent id). The mutator
/// pre-checks existence so callers see a domain-level not-found instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayStoreError {
    #[error("no premium record for {0}")]
    NotFound(ProductId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Durable keyed storage of premium records.
///
/// ## Consistency
///
/// - `upsert` and `delete` on the same id serialize: the last one to complete
///   wins and no reader ever sees a partially-written record.
/// - Operations on different ids must not block each other for longer than a
///   constant-time critical section.
/// - `list_all` returns records ordered by `created_at`, then `id`.
#[async_trait::async_trait]
pub trait OverlayStore: Send + Sync {
    async fn get(&self, id: &ProductId) -> Result<Option<PremiumRecord>, OverlayStoreError>;

    async fn list_all(&self) -> Result<Vec<PremiumRecord>, OverlayStoreError>;

    /// Create the record, or overwrite its attributes if it already exists.
    async fn upsert(
        &self,
        id: ProductId,
        attributes: PremiumAttributes,
    ) -> Result<PremiumRecord, OverlayStoreError>;

    /// Hard delete. Fails with [`OverlayStoreError::NotFound`] if absent.
    async fn delete(&self, id: &ProductId) -> Result<(), OverlayStoreError>;

    /// Ids of all premium records, in `list_all` order.
    async fn list_ids(&self) -> Result<Vec<ProductId>, OverlayStoreError> {
        Ok(self.list_all().await?.into_iter().map(|r| r.id).collect())
    }
}

#[async_trait::async_trait]
impl<S> OverlayStore for Arc<S>
where
    S: OverlayStore + ?Sized,
{
    async fn get(&self, id: &ProductId) -> Result<Option<PremiumRecord>, OverlayStoreError> {
        (**self).get(id).await
    }

    async fn list_all(&self) -> Result<Vec<PremiumRecord>, OverlayStoreError> {
        (**self).list_all().await
    }

    async fn upsert(
        &self,
        id: ProductId,
        attributes: PremiumAttributes,
    ) -> Result<PremiumRecord, OverlayStoreError> {
        (**self).upsert(id, attributes).await
    }

    async fn delete(&self, id: &ProductId) -> Result<(), OverlayStoreError> {
        (**self).delete(id).await
    }

    async fn list_ids(&self) -> Result<Vec<ProductId>, OverlayStoreError> {
        (**self).list_ids().await
    }
}
