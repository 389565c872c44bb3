use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    message: &'static str,
    metadata_store: ConnectionState,
    /// Static marker; the object store is not probed
    object_store: &'static str,
    timestamp: DateTime<Utc>,
}

/// Liveness plus the last known state of both stores. Always 200.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let metadata_store = if state.metadata_store.is_connected() {
        ConnectionState::Connected
    } else {
        ConnectionState::Disconnected
    };

    Json(HealthResponse {
        message: "Server is running!",
        metadata_store,
        object_store: "configured",
        timestamp: Utc::now(),
    })
}
