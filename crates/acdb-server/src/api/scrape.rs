use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct TriggerData {
    started: bool,
}

/// `POST /api/v1/scrape`: starts a cycle in the background. A cycle that is
/// already in flight is left alone and the caller gets `409 conflict`.
pub(super) async fn trigger(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<TriggerData>>), ApiError> {
    if !state.coordinator.spawn_cycle() {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "a scrape cycle is already running",
        ));
    }
    tracing::info!(request_id = %req_id.0, "scrape cycle triggered over http");
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(TriggerData { started: true }, req_id.0)),
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};

    use super::super::test_support::{app, send};

    fn post() -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/scrape")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn second_trigger_conflicts_while_cycle_runs() {
        let (app, coordinator) = app();

        let (status, json) = send(app.clone(), post()).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["data"]["started"], true);
        assert!(coordinator.is_running());

        let (status, json) = send(app, post()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");
    }
}
