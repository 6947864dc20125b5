//! Read-only listing lookups. Empty result sets are reported as
//! `404 not_found`.

use std::str::FromStr;

use acdb_core::Retailer;
use acdb_db::ListingRow;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

type ListingsResponse = Result<Json<ApiResponse<Vec<ListingItem>>>, ApiError>;

#[derive(Debug, Serialize)]
pub(super) struct ListingItem {
    name: String,
    url: String,
    price: Option<Decimal>,
    currency: String,
    btu: Option<i32>,
    service_area: Option<f64>,
    store: String,
    updated_at: DateTime<Utc>,
}

impl From<ListingRow> for ListingItem {
    fn from(row: ListingRow) -> Self {
        Self {
            name: row.name,
            url: row.url,
            price: row.price,
            currency: row.currency,
            btu: row.btu,
            service_area: row.service_area,
            store: row.store,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ExtremesData {
    btu_min: i32,
    btu_max: i32,
    products: Vec<ListingItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoresData {
    stores: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BtuRangeQuery {
    btu_min: i32,
    btu_max: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct PriceRangeQuery {
    price_min: Decimal,
    price_max: Decimal,
}

fn bad_request(req_id: &RequestId, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id.0.clone(), "bad_request", message)
}

fn parse_path<T: FromStr>(req_id: &RequestId, raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| bad_request(req_id, format!("invalid {what}: {raw}")))
}

fn listings_or_404(req_id: RequestId, rows: Vec<ListingRow>) -> ListingsResponse {
    if rows.is_empty() {
        return Err(ApiError::new(req_id.0, "not_found", "no listings found"));
    }
    let data = rows.into_iter().map(ListingItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn by_btu_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<BtuRangeQuery>, QueryRejection>,
) -> ListingsResponse {
    let Query(query) = query.map_err(|e| bad_request(&req_id, e.body_text()))?;
    if query.btu_min > query.btu_max {
        return Err(bad_request(&req_id, "btu_min must not exceed btu_max"));
    }
    let rows = acdb_db::list_by_btu_range(&state.pool, query.btu_min, query.btu_max)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}

pub(super) async fn by_btu(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(btu): Path<String>,
) -> ListingsResponse {
    let btu: i32 = parse_path(&req_id, &btu, "btu")?;
    let rows = acdb_db::list_by_btu(&state.pool, btu)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}

pub(super) async fn extremes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ExtremesData>>, ApiError> {
    let extremes = acdb_db::btu_extremes(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no BTU values recorded"))?;

    let data = ExtremesData {
        btu_min: extremes.btu_min,
        btu_max: extremes.btu_max,
        products: extremes.listings.into_iter().map(ListingItem::from).collect(),
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StoresData>>, ApiError> {
    let stores = acdb_db::list_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if stores.is_empty() {
        return Err(ApiError::new(req_id.0, "not_found", "no stores scraped yet"));
    }
    Ok(Json(ApiResponse::new(StoresData { stores }, req_id.0)))
}

pub(super) async fn by_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store): Path<String>,
) -> ListingsResponse {
    let retailer = Retailer::from_str(&store)
        .map_err(|_| ApiError::new(req_id.0.clone(), "not_found", format!("store {store} not found")))?;
    let rows = acdb_db::list_by_store(&state.pool, retailer)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}

pub(super) async fn by_service_area(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(area): Path<String>,
) -> ListingsResponse {
    let area: f64 = parse_path(&req_id, &area, "service area")?;
    if !area.is_finite() {
        return Err(bad_request(&req_id, "service area must be a finite number"));
    }
    let rows = acdb_db::list_by_service_area(&state.pool, area)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}

pub(super) async fn by_price(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(price): Path<String>,
) -> ListingsResponse {
    let price: Decimal = parse_path(&req_id, &price, "price")?;
    let rows = acdb_db::list_by_price(&state.pool, price)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}

pub(super) async fn by_price_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<PriceRangeQuery>, QueryRejection>,
) -> ListingsResponse {
    let Query(query) = query.map_err(|e| bad_request(&req_id, e.body_text()))?;
    if query.price_min > query.price_max {
        return Err(bad_request(&req_id, "price_min must not exceed price_max"));
    }
    let rows = acdb_db::list_by_price_range(&state.pool, query.price_min, query.price_max)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    listings_or_404(req_id, rows)
}
