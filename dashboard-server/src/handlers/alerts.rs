//! Alert table handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::models::{AlertPage, AlertQuery};
use crate::{AppError, AppResult, AppState};

/// Filtered, sorted, paginated alerts
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<AlertQuery>, QueryRejection>,
) -> AppResult<Json<AlertPage>> {
    let Query(query) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let batch = state.batch().await;
    Ok(Json(query.apply(&batch.alerts)?))
}
