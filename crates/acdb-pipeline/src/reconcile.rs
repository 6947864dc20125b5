//! Hash-gated replacement of a retailer's persisted snapshot.
//!
//! On a changed listing set the retailer's records are replaced and its
//! slice of the combined snapshot is rebuilt. Each step is a separate store
//! call; a failure stops the sequence without undoing earlier steps. The
//! next run with a different hash repairs the state.

use acdb_core::{ListingRecord, Retailer};
use acdb_db::{DbError, ListingStore, StoredListing};
use chrono::Utc;
use thiserror::Error;

use crate::fingerprint::content_hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing was scraped; the stored snapshot was left alone.
    SkippedEmpty,
    /// The fingerprint matched the stored one; nothing was written.
    Unchanged { hash: String },
    /// The snapshot was replaced. Counts are rows written per table.
    Replaced {
        hash: String,
        listings: u64,
        combined: u64,
    },
}

/// Store step that was running when reconciliation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    ReadMetadata,
    ClearRetailer,
    WriteMetadata,
    WriteRetailer,
    ClearCombined,
    WriteCombined,
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReconcilePhase::ReadMetadata => "read snapshot metadata",
            ReconcilePhase::ClearRetailer => "clear retailer listings",
            ReconcilePhase::WriteMetadata => "write snapshot metadata",
            ReconcilePhase::WriteRetailer => "write retailer listings",
            ReconcilePhase::ClearCombined => "clear combined listings",
            ReconcilePhase::WriteCombined => "write combined listings",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{retailer}: failed to fingerprint listings: {source}")]
    Fingerprint {
        retailer: Retailer,
        #[source]
        source: serde_json::Error,
    },

    #[error("{retailer}: {phase} failed: {source}")]
    Store {
        retailer: Retailer,
        phase: ReconcilePhase,
        #[source]
        source: DbError,
    },
}

impl ReconcileError {
    #[must_use]
    pub fn retailer(&self) -> Retailer {
        match self {
            ReconcileError::Fingerprint { retailer, .. } | ReconcileError::Store { retailer, .. } => {
                *retailer
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> Option<ReconcilePhase> {
        match self {
            ReconcileError::Fingerprint { .. } => None,
            ReconcileError::Store { phase, .. } => Some(*phase),
        }
    }
}

/// Persists `listings` as the current snapshot of `retailer` if and only if
/// the set is non-empty and its fingerprint differs from the stored one.
///
/// # Errors
///
/// Returns [`ReconcileError`] naming the first store step that failed.
/// Steps before it remain applied.
pub async fn reconcile(
    store: &dyn ListingStore,
    retailer: Retailer,
    listings: Vec<ListingRecord>,
) -> Result<ReconcileOutcome, ReconcileError> {
    let listings: Vec<ListingRecord> = listings
        .into_iter()
        .filter(ListingRecord::is_identifiable)
        .collect();
    if listings.is_empty() {
        tracing::info!(%retailer, "reconcile: empty listing set; keeping stored snapshot");
        return Ok(ReconcileOutcome::SkippedEmpty);
    }

    let hash = content_hash(&listings)
        .map_err(|source| ReconcileError::Fingerprint { retailer, source })?;
    let store_err = |phase: ReconcilePhase| {
        move |source: DbError| ReconcileError::Store {
            retailer,
            phase,
            source,
        }
    };

    let previous = store
        .snapshot_hash(retailer)
        .await
        .map_err(store_err(ReconcilePhase::ReadMetadata))?;
    if previous.as_deref() == Some(hash.as_str()) {
        tracing::info!(%retailer, %hash, "reconcile: listing set unchanged");
        return Ok(ReconcileOutcome::Unchanged { hash });
    }

    let now = Utc::now();
    let stored: Vec<StoredListing> = listings
        .into_iter()
        .map(|listing| StoredListing {
            listing,
            updated_at: now,
        })
        .collect();

    let removed = store
        .clear_retailer_listings(retailer)
        .await
        .map_err(store_err(ReconcilePhase::ClearRetailer))?;
    store
        .put_snapshot_metadata(retailer, &hash, now)
        .await
        .map_err(store_err(ReconcilePhase::WriteMetadata))?;
    let written = store
        .upsert_retailer_listings(retailer, &stored)
        .await
        .map_err(store_err(ReconcilePhase::WriteRetailer))?;

    let removed_combined = store
        .clear_combined_source(retailer)
        .await
        .map_err(store_err(ReconcilePhase::ClearCombined))?;
    let combined = store
        .upsert_combined_listings(retailer, &stored)
        .await
        .map_err(store_err(ReconcilePhase::WriteCombined))?;

    tracing::info!(
        %retailer,
        %hash,
        removed,
        written,
        removed_combined,
        combined,
        "reconcile: snapshot replaced"
    );

    Ok(ReconcileOutcome::Replaced {
        hash,
        listings: written,
        combined,
    })
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
