//! Chart data handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use nids_core::constants::DEFAULT_TOP_N;
use nids_core::logic::alert::{self, summary::{DailyCount, SeverityCount}, TopTalkers};
use serde::Deserialize;
use validator::Validate;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct TopTalkersQuery {
    #[validate(range(min = 1, max = 100))]
    pub n: Option<usize>,
}

/// Alerts per calendar day, ascending
pub async fn traffic(State(state): State<AppState>) -> Json<Vec<DailyCount>> {
    let batch = state.batch().await;
    Json(alert::count_by_date(&batch.alerts))
}

/// Alerts per severity
pub async fn severity(State(state): State<AppState>) -> Json<Vec<SeverityCount>> {
    let batch = state.batch().await;
    Json(alert::count_by_severity(&batch.alerts))
}

/// Most frequent sources and destinations
pub async fn top_talkers(
    State(state): State<AppState>,
    query: Result<Query<TopTalkersQuery>, QueryRejection>,
) -> AppResult<Json<TopTalkers>> {
    let Query(query) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let batch = state.batch().await;
    Ok(Json(alert::top_talkers(&batch.alerts, query.n.unwrap_or(DEFAULT_TOP_N))))
}
