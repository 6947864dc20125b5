//! Write seam used by reconciliation.
//!
//! Every mutation of persisted listing state goes through [`ListingStore`].
//! Operations are individually atomic at most; callers sequence them and
//! accept that a failure midway leaves earlier steps applied.

use std::collections::HashMap;

use acdb_core::{ListingRecord, Retailer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::DbError;

/// A listing as persisted, stamped with the time it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredListing {
    pub listing: ListingRecord,
    pub updated_at: DateTime<Utc>,
}

/// The metadata row that records a retailer's last accepted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub retailer: Retailer,
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Hash stored by the last successful snapshot write, if any.
    async fn snapshot_hash(&self, retailer: Retailer) -> Result<Option<String>, DbError>;

    /// Removes every listing of `retailer` from its per-retailer table.
    /// Snapshot metadata is untouched. Returns the number of rows removed.
    async fn clear_retailer_listings(&self, retailer: Retailer) -> Result<u64, DbError>;

    /// Creates or overwrites the snapshot metadata for `retailer`.
    async fn put_snapshot_metadata(
        &self,
        retailer: Retailer,
        content_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DbError>;

    /// Upserts listings keyed by url. Returns the number of rows written.
    async fn upsert_retailer_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError>;

    /// Removes every combined-snapshot record whose source is `retailer`.
    async fn clear_combined_source(&self, retailer: Retailer) -> Result<u64, DbError>;

    /// Upserts listings into the combined snapshot under
    /// [`acdb_core::combined_key`] with `retailer` as source.
    async fn upsert_combined_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError>;
}

/// Collapses listings that share a url, keeping the position of the first
/// occurrence and the contents of the last.
pub(crate) fn dedupe_by_url(listings: &[StoredListing]) -> Vec<&StoredListing> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(listings.len());
    let mut out: Vec<&StoredListing> = Vec::with_capacity(listings.len());
    for stored in listings {
        match positions.get(stored.listing.url.as_str()) {
            Some(&idx) => out[idx] = stored,
            None => {
                positions.insert(stored.listing.url.as_str(), out.len());
                out.push(stored);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stored(name: &str, url: &str) -> StoredListing {
        StoredListing {
            listing: ListingRecord::new(name, url, Retailer::Gree).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn dedupe_keeps_first_position_last_value() {
        let input = vec![
            stored("A", "https://x/a"),
            stored("B", "https://x/b"),
            stored("A2", "https://x/a"),
        ];
        let out = dedupe_by_url(&input);
        let names: Vec<&str> = out.iter().map(|s| s.listing.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[test]
    fn dedupe_of_unique_urls_is_identity() {
        let input = vec![stored("A", "https://x/a"), stored("B", "https://x/b")];
        assert_eq!(dedupe_by_url(&input).len(), 2);
    }
}
