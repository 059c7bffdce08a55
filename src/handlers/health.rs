use crate::core::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
    pub timestamp: i64,
}

/// Health check handler
///
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            sessions: state.sessions.len(),
            timestamp,
        }),
    )
}
