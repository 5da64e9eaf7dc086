//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    alerts: usize,
    scored_at: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let batch = state.batch().await;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        alerts: batch.alerts.len(),
        scored_at: batch.scored_at.timestamp(),
    })
}
