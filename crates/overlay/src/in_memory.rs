use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use premier_core::ProductId;

use crate::record::{PremiumAttributes, PremiumRecord};
use crate::store::{OverlayStore, OverlayStoreError};

const DEFAULT_SHARDS: usize = 16;

type Shard = RwLock<HashMap<ProductId, PremiumRecord>>;

/// In-memory overlay store for tests/dev.
///
/// Ids are striped across independently locked shards. A mutation holds only
/// its shard's write lock, and only for the map operation itself, so writers
/// on different ids never wait on each other for more than that.
#[derive(Debug)]
pub struct InMemoryOverlayStore {
    shards: Vec<Shard>,
}

impl InMemoryOverlayStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    pub fn with_shards(count: usize) -> Self {
        let count = count.max(1);
        Self {
            shards: (0..count).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, id: &ProductId) -> &Shard {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }
}

impl Default for InMemoryOverlayStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> OverlayStoreError {
    OverlayStoreError::Storage("overlay shard lock poisoned".to_string())
}

#[async_trait::async_trait]
impl OverlayStore for InMemoryOverlayStore {
    async fn get(&self, id: &ProductId) -> Result<Option<PremiumRecord>, OverlayStoreError> {
        let map = self.shard(id).read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<PremiumRecord>, OverlayStoreError> {
        let mut out = Vec::new();
        for shard in &self.shards {
            let map = shard.read().map_err(poisoned)?;
            out.extend(map.values().cloned());
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn upsert(
        &self,
        id: ProductId,
        attributes: PremiumAttributes,
    ) -> Result<PremiumRecord, OverlayStoreError> {
        let mut map = self.shard(&id).write().map_err(poisoned)?;
        let now = Utc::now();
        let record = match map.remove(&id) {
            Some(existing) => existing.refreshed(attributes, now),
            None => PremiumRecord::created(id.clone(), attributes, now),
        };
        map.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), OverlayStoreError> {
        let mut map = self.shard(id).write().map_err(poisoned)?;
        match map.remove(id) {
            Some(_) => Ok(()),
            None => Err(OverlayStoreError::NotFound(id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    fn attrs(title: &str) -> PremiumAttributes {
        PremiumAttributes::new("img.png", title, "10USD").unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_then_refreshes() {
        let store = InMemoryOverlayStore::new();

        let created = store.upsert(pid("P1"), attrs("Shirt")).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let refreshed = store.upsert(pid("P1"), attrs("Shirt v2")).await.unwrap();
        assert_eq!(refreshed.created_at, created.created_at);
        assert!(refreshed.updated_at >= created.updated_at);
        assert_eq!(refreshed.title(), "Shirt v2");

        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn identical_upserts_are_idempotent() {
        let store = InMemoryOverlayStore::new();
        let first = store.upsert(pid("P1"), attrs("Shirt")).await.unwrap();
        let second = store.upsert(pid("P1"), attrs("Shirt")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_all().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn delete_absent_is_not_found() {
        let store = InMemoryOverlayStore::new();
        let err = store.delete(&pid("nope")).await.unwrap_err();
        assert_eq!(err, OverlayStoreError::NotFound(pid("nope")));
    }

    #[tokio::test]
    async fn delete_is_hard() {
        let store = InMemoryOverlayStore::new();
        store.upsert(pid("P1"), attrs("Shirt")).await.unwrap();
        store.delete(&pid("P1")).await.unwrap();
        assert_eq!(store.get(&pid("P1")).await.unwrap(), None);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_all_is_ordered_and_stable() {
        let store = InMemoryOverlayStore::with_shards(4);
        for i in 0..20 {
            store.upsert(pid(&format!("P{i:02}")), attrs("x")).await.unwrap();
        }
        let a = store.list_all().await.unwrap();
        let b = store.list_all().await.unwrap();
        assert_eq!(a, b);
        for w in a.windows(2) {
            assert!((w[0].created_at, &w[0].id) <= (w[1].created_at, &w[1].id));
        }
        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, a.iter().map(|r| r.id.clone()).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_upsert_and_delete_end_in_a_whole_state() {
        for _ in 0..50 {
            let store = Arc::new(InMemoryOverlayStore::new());
            store.upsert(pid("P1"), attrs("before")).await.unwrap();

            let s1 = store.clone();
            let s2 = store.clone();
            let up = tokio::spawn(async move { s1.upsert(pid("P1"), attrs("after")).await });
            let del = tokio::spawn(async move { s2.delete(&pid("P1")).await });
            up.await.unwrap().unwrap();
            let _ = del.await.unwrap();

            match store.get(&pid("P1")).await.unwrap() {
                None => {}
                Some(r) => assert_eq!(r.title(), "after"),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks_on_distinct_ids_all_land() {
        let store = Arc::new(InMemoryOverlayStore::new());
        let mut handles = Vec::new();
        for i in 0..200 {
            let s = store.clone();
            handles.push(tokio::spawn(async move {
                s.upsert(pid(&format!("P{i}")), attrs("x")).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.list_all().await.unwrap().len(), 200);
    }
}
