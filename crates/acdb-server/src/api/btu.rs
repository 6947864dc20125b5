use acdb_core::{calculate_btu, BtuRequest, BtuResult};
use axum::{extract::rejection::JsonRejection, Extension, Json};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse};

/// `POST /api/v1/btu/calculate`. Malformed bodies and out-of-range fields
/// both come back as `400 validation_error`.
pub(super) async fn calculate(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<BtuRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BtuResult>>, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let result = calculate_btu(&request)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    Ok(Json(ApiResponse::new(result, req_id.0)))
}
