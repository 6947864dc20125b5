use std::time::Duration;

use acdb_pipeline::StatusChannel;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StatusData {
    status: String,
    running: bool,
}

pub(super) async fn current(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<StatusData>> {
    let data = StatusData {
        status: state.coordinator.status().current(),
        running: state.coordinator.is_running(),
    };
    Json(ApiResponse::new(data, req_id.0))
}

/// Upgrades to a websocket that receives the status text on every tick.
pub(super) async fn websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let status = state.coordinator.status().clone();
    let interval = state.status_push_interval;
    ws.on_upgrade(move |socket| push_status(socket, status, interval))
}

async fn push_status(mut socket: WebSocket, status: StatusChannel, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if socket.send(Message::Text(status.current().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("status websocket closed");
}
