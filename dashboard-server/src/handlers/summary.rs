//! Summary and describe handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use nids_core::logic::alert::{self, summary::SeverityCount, AlertSummary, ColumnStats, ModelMetrics};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: AlertSummary,
    pub by_severity: Vec<SeverityCount>,
    pub severity_source: &'static str,
    pub scorer: String,
    pub input: String,
    pub scored_at: DateTime<Utc>,
    /// Present only when the input carried ground-truth labels
    pub metrics: Option<ModelMetrics>,
}

/// Headline metrics for the live batch
pub async fn summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let batch = state.batch().await;
    let alerts = &batch.alerts;

    Json(SummaryResponse {
        summary: alert::summarize(alerts),
        by_severity: alert::count_by_severity(alerts),
        severity_source: batch.severity_source.as_str(),
        scorer: batch.scorer.clone(),
        input: batch.input.clone(),
        scored_at: batch.scored_at,
        metrics: alert::evaluate(alerts),
    })
}

/// Descriptive statistics per numeric column
pub async fn describe(State(state): State<AppState>) -> Json<Vec<ColumnStats>> {
    let batch = state.batch().await;
    Json(alert::describe(&batch.alerts))
}
