//! [`ListingStore`] backed by the Postgres listing tables.

use acdb_core::{combined_key, Retailer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::store::{dedupe_by_url, ListingStore, StoredListing};
use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Column-wise view of a listing batch for `UNNEST` binding.
struct ListingColumns {
    urls: Vec<String>,
    names: Vec<String>,
    prices: Vec<Option<Decimal>>,
    currencies: Vec<String>,
    btus: Vec<Option<i32>>,
    service_areas: Vec<Option<f64>>,
    stores: Vec<String>,
    updated_ats: Vec<DateTime<Utc>>,
}

impl ListingColumns {
    fn from_batch(batch: &[&StoredListing]) -> Self {
        let n = batch.len();
        let mut cols = Self {
            urls: Vec::with_capacity(n),
            names: Vec::with_capacity(n),
            prices: Vec::with_capacity(n),
            currencies: Vec::with_capacity(n),
            btus: Vec::with_capacity(n),
            service_areas: Vec::with_capacity(n),
            stores: Vec::with_capacity(n),
            updated_ats: Vec::with_capacity(n),
        };
        for stored in batch {
            let l = &stored.listing;
            cols.urls.push(l.url.clone());
            cols.names.push(l.name.clone());
            cols.prices.push(l.price);
            cols.currencies.push(l.currency.clone());
            cols.btus.push(l.btu);
            cols.service_areas.push(l.service_area);
            cols.stores.push(l.store.slug().to_string());
            cols.updated_ats.push(stored.updated_at);
        }
        cols
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn snapshot_hash(&self, retailer: Retailer) -> Result<Option<String>, DbError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT content_hash FROM retailer_snapshots WHERE retailer = $1",
        )
        .bind(retailer.slug())
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash)
    }

    async fn clear_retailer_listings(&self, retailer: Retailer) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM retailer_listings WHERE retailer = $1")
            .bind(retailer.slug())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn put_snapshot_metadata(
        &self,
        retailer: Retailer,
        content_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO retailer_snapshots (retailer, content_hash, updated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (retailer) DO UPDATE SET \
                 content_hash = EXCLUDED.content_hash, \
                 updated_at   = EXCLUDED.updated_at",
        )
        .bind(retailer.slug())
        .bind(content_hash)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// One `INSERT … SELECT FROM UNNEST(…) ON CONFLICT` per batch. Urls are
    /// deduplicated first; Postgres rejects a batch that hits the same
    /// conflict key twice.
    async fn upsert_retailer_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        if listings.is_empty() {
            return Ok(0);
        }
        let cols = ListingColumns::from_batch(&dedupe_by_url(listings));

        let result = sqlx::query(
            "INSERT INTO retailer_listings \
                 (retailer, url, name, price, currency, btu, service_area, store, updated_at) \
             SELECT $1, * FROM UNNEST(\
                  $2::text[], $3::text[], $4::numeric[], $5::text[], $6::int4[], \
                  $7::float8[], $8::text[], $9::timestamptz[]) \
             ON CONFLICT (retailer, url) DO UPDATE SET \
                 name         = EXCLUDED.name, \
                 price        = EXCLUDED.price, \
                 currency     = EXCLUDED.currency, \
                 btu          = EXCLUDED.btu, \
                 service_area = EXCLUDED.service_area, \
                 store        = EXCLUDED.store, \
                 updated_at   = EXCLUDED.updated_at",
        )
        .bind(retailer.slug())
        .bind(&cols.urls)
        .bind(&cols.names)
        .bind(&cols.prices)
        .bind(&cols.currencies)
        .bind(&cols.btus)
        .bind(&cols.service_areas)
        .bind(&cols.stores)
        .bind(&cols.updated_ats)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear_combined_source(&self, retailer: Retailer) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM combined_listings WHERE source = $1")
            .bind(retailer.slug())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn upsert_combined_listings(
        &self,
        retailer: Retailer,
        listings: &[StoredListing],
    ) -> Result<u64, DbError> {
        if listings.is_empty() {
            return Ok(0);
        }
        let batch = dedupe_by_url(listings);
        let keys: Vec<String> = batch
            .iter()
            .map(|s| combined_key(retailer, &s.listing.url))
            .collect();
        let cols = ListingColumns::from_batch(&batch);

        let result = sqlx::query(
            "INSERT INTO combined_listings \
                 (source, listing_key, url, name, price, currency, btu, service_area, store, \
                  updated_at) \
             SELECT $1, * FROM UNNEST(\
                  $2::text[], $3::text[], $4::text[], $5::numeric[], $6::text[], $7::int4[], \
                  $8::float8[], $9::text[], $10::timestamptz[]) \
             ON CONFLICT (listing_key) DO UPDATE SET \
                 source       = EXCLUDED.source, \
                 url          = EXCLUDED.url, \
                 name         = EXCLUDED.name, \
                 price        = EXCLUDED.price, \
                 currency     = EXCLUDED.currency, \
                 btu          = EXCLUDED.btu, \
                 service_area = EXCLUDED.service_area, \
                 store        = EXCLUDED.store, \
                 updated_at   = EXCLUDED.updated_at",
        )
        .bind(retailer.slug())
        .bind(&keys)
        .bind(&cols.urls)
        .bind(&cols.names)
        .bind(&cols.prices)
        .bind(&cols.currencies)
        .bind(&cols.btus)
        .bind(&cols.service_areas)
        .bind(&cols.stores)
        .bind(&cols.updated_ats)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
