//! Reload handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub total: usize,
    pub severity_source: &'static str,
    pub scorer: String,
    pub scored_at: DateTime<Utc>,
}

/// Rescore the configured input; on failure the previous batch stays live
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let batch = state.reload().await?;
    Ok(Json(ReloadResponse {
        status: "reloaded",
        total: batch.alerts.len(),
        severity_source: batch.severity_source.as_str(),
        scorer: batch.scorer.clone(),
        scored_at: batch.scored_at,
    }))
}
