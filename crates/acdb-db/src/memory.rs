//! In-process [`ListingStore`] for dry runs and tests.

use std::collections::BTreeMap;

use acdb_core::{combined_key, Retailer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::store::{dedupe_by_url, ListingStore, SnapshotMeta, StoredListing};
use crate::DbError;

#[derive(Debug, Default)]
struct State {
    snapshots: BTreeMap<Retailer, SnapshotMeta>,
    retailer_listings: BTreeMap<(Retailer, String), StoredListing>,
    /// Keyed by combined key; value carries the source retailer.
    combined: BTreeMap<String, (Retailer, StoredListing)>,
}

/// Holds the same three collections as the Postgres schema in `BTreeMap`s,
/// so reads come back in key order.
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    state: Mutex<State>,
}

impl MemoryListingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self, retailer: Retailer) -> Option<SnapshotMeta> {
        self.state.lock().await.snapshots.get(&retailer).cloned()
    }

    /// Listings of one retailer, ordered by url.
    pub async fn retailer_listings(&self, retailer: Retailer) -> Vec<StoredListing> {
        self.state
            .lock()
            .await
            .retailer_listings
            .iter()
            .filter(|((r, _), _)| *r == retailer)
            .map(|(_, stored)| stored.clone())
            .collect()
    }

    /// The combined snapshot as `(key, source, listing)`, ordered by key.
    pub async fn combined_listings(&self) -> Vec<(String, Retailer, StoredListing)> {
        self.state
            .lock()
            .await
            .combined
            .iter()
            .map(|(key, (source, stored))| (key.clone(), *source, stored.clone()))
            .collect()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn snapshot_hash(&self, retailer: Retailer) -> Result<Option<String>, DbError> {
        Ok(self
            .state
            .lock()
            .await
            .snapshots
            .get(&retailer)
            .map(|meta| meta.content_hash.clone()))
    }

    async fn clear_retailer_listings(&self, retailer: Retailer) -> Result<u64, DbError> {
        let mut state = self.state.lock().await;
        let before = state.retailer_listings.len();
        state.retailer_listings.retain(|(r, _), _| *r != retailer);
        Ok((before - state.retailer_listings.len()) as u64)
    }

    async fn put_snapshot_metadata(
        &self,
        retailer: Retailer,
        content_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.state.lock().await.snapshots.insert(
            retailer,
            SnapshotMeta {
                retailer,
                content_hash: content_hash.to_string(),
                updated_at,
            },
        );
        Ok(())
    }

    async fn upsert_retailer_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        let mut state = self.state.lock().await;
        let batch = dedupe_by_url(listings);
        for stored in &batch {
            state
                .retailer_listings
                .insert((retailer, stored.listing.url.clone()), (*stored).clone());
        }
        Ok(batch.len() as u64)
    }

    async fn clear_combined_source(&self, retailer: Retailer) -> Result<u64, DbError> {
        let mut state = self.state.lock().await;
        let before = state.combined.len();
        state.combined.retain(|_, (source, _)| *source != retailer);
        Ok((before - state.combined.len()) as u64)
    }

    async fn upsert_combined_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        let mut state = self.state.lock().await;
        let batch = dedupe_by_url(listings);
        for stored in &batch {
            state.combined.insert(
                combined_key(retailer, &stored.listing.url),
                (retailer, (*stored).clone()),
            );
        }
        Ok(batch.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use acdb_core::ListingRecord;

    use super::*;

    fn stored(retailer: Retailer, url: &str) -> StoredListing {
        StoredListing {
            listing: ListingRecord::new("Unit", url, retailer).unwrap(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn clearing_one_retailer_leaves_others() {
        let store = MemoryListingStore::new();
        store
            .upsert_retailer_listings(Retailer::Gree, &[stored(Retailer::Gree, "https://g/1")])
            .await
            .unwrap();
        store
            .upsert_retailer_listings(Retailer::Jara, &[stored(Retailer::Jara, "https://j/1")])
            .await
            .unwrap();

        assert_eq!(store.clear_retailer_listings(Retailer::Gree).await.unwrap(), 1);
        assert!(store.retailer_listings(Retailer::Gree).await.is_empty());
        assert_eq!(store.retailer_listings(Retailer::Jara).await.len(), 1);
    }

    #[tokio::test]
    async fn combined_records_use_prefixed_keys() {
        let store = MemoryListingStore::new();
        store
            .upsert_combined_listings(Retailer::Gree, &[stored(Retailer::Gree, "https://g/1")])
            .await
            .unwrap();

        let combined = store.combined_listings().await;
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].0, "gree_https://g/1");
        assert_eq!(combined[0].1, Retailer::Gree);

        assert_eq!(store.clear_combined_source(Retailer::Jara).await.unwrap(), 0);
        assert_eq!(store.clear_combined_source(Retailer::Gree).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn metadata_is_overwritten() {
        let store = MemoryListingStore::new();
        assert!(store.snapshot_hash(Retailer::Gree).await.unwrap().is_none());

        store
            .put_snapshot_metadata(Retailer::Gree, "aaa", Utc::now())
            .await
            .unwrap();
        store
            .put_snapshot_metadata(Retailer::Gree, "bbb", Utc::now())
            .await
            .unwrap();

        assert_eq!(
            store.snapshot_hash(Retailer::Gree).await.unwrap().as_deref(),
            Some("bbb")
        );
    }
}
