//! Read queries over the listing tables, used by the HTTP API.
//!
//! Cross-retailer lookups read `combined_listings`; per-store lookups read
//! `retailer_listings`.

use acdb_core::Retailer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Half-width of the service-area window, in square metres.
const SERVICE_AREA_TOLERANCE: f64 = 5.0;

const LISTING_COLUMNS: &str =
    "name, url, price, currency, btu, service_area, store, updated_at";

/// A listing row from either listing table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub name: String,
    pub url: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub btu: Option<i32>,
    pub service_area: Option<f64>,
    pub store: String,
    pub updated_at: DateTime<Utc>,
}

/// Smallest and largest BTU in the combined snapshot, with the listings at
/// either value.
#[derive(Debug, Clone)]
pub struct BtuExtremes {
    pub btu_min: i32,
    pub btu_max: i32,
    pub listings: Vec<ListingRow>,
}

fn combined_query(predicate: &str) -> String {
    format!(
        "SELECT {LISTING_COLUMNS} FROM combined_listings WHERE {predicate} ORDER BY listing_key"
    )
}

/// Listings whose BTU equals `btu`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_btu(pool: &PgPool, btu: i32) -> Result<Vec<ListingRow>, DbError> {
    let rows = sqlx::query_as::<_, ListingRow>(&combined_query("btu = $1"))
        .bind(btu)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Listings with a BTU in `[btu_min, btu_max]`; rows without BTU never match.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_btu_range(
    pool: &PgPool,
    btu_min: i32,
    btu_max: i32,
) -> Result<Vec<ListingRow>, DbError> {
    let rows = sqlx::query_as::<_, ListingRow>(&combined_query("btu BETWEEN $1 AND $2"))
        .bind(btu_min)
        .bind(btu_max)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_price(pool: &PgPool, price: Decimal) -> Result<Vec<ListingRow>, DbError> {
    let rows = sqlx::query_as::<_, ListingRow>(&combined_query("price = $1"))
        .bind(price)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_price_range(
    pool: &PgPool,
    price_min: Decimal,
    price_max: Decimal,
) -> Result<Vec<ListingRow>, DbError> {
    let rows = sqlx::query_as::<_, ListingRow>(&combined_query("price BETWEEN $1 AND $2"))
        .bind(price_min)
        .bind(price_max)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Listings whose service area lies within ±5 m² of `area`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_service_area(pool: &PgPool, area: f64) -> Result<Vec<ListingRow>, DbError> {
    let rows = sqlx::query_as::<_, ListingRow>(&combined_query("service_area BETWEEN $1 AND $2"))
        .bind(area - SERVICE_AREA_TOLERANCE)
        .bind(area + SERVICE_AREA_TOLERANCE)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The current listing set of one retailer, ordered by url.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_by_store(pool: &PgPool, retailer: Retailer) -> Result<Vec<ListingRow>, DbError> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM retailer_listings WHERE retailer = $1 ORDER BY url"
    );
    let rows = sqlx::query_as::<_, ListingRow>(&sql)
        .bind(retailer.slug())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Slugs of retailers that have a stored snapshot, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let stores = sqlx::query_scalar::<_, String>(
        "SELECT retailer FROM retailer_snapshots ORDER BY retailer",
    )
    .fetch_all(pool)
    .await?;
    Ok(stores)
}

/// Returns `None` when no combined listing carries a BTU value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn btu_extremes(pool: &PgPool) -> Result<Option<BtuExtremes>, DbError> {
    let (btu_min, btu_max) = sqlx::query_as::<_, (Option<i32>, Option<i32>)>(
        "SELECT MIN(btu), MAX(btu) FROM combined_listings",
    )
    .fetch_one(pool)
    .await?;

    let (Some(btu_min), Some(btu_max)) = (btu_min, btu_max) else {
        return Ok(None);
    };

    let listings = sqlx::query_as::<_, ListingRow>(&combined_query("btu IN ($1, $2)"))
        .bind(btu_min)
        .bind(btu_max)
        .fetch_all(pool)
        .await?;

    Ok(Some(BtuExtremes {
        btu_min,
        btu_max,
        listings,
    }))
}
