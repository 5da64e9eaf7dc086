//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use nids_core::PipelineError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    /// Input rows did not match the expected schema
    #[error("{0}")]
    SchemaError(String),

    /// Nothing to score until the deployment is configured
    #[error("{0}")]
    ConfigError(String),

    /// Model artifacts or scoring failed; the previous batch stays live
    #[error("{kind}: {message}")]
    PipelineError { kind: &'static str, message: String },

    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AppError::SchemaError(msg) => {
                tracing::warn!("Schema error: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, "schema_error", msg.clone())
            }
            AppError::ConfigError(msg) => {
                tracing::warn!("Configuration error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "config_error", msg.clone())
            }
            AppError::PipelineError { kind, message } => {
                tracing::error!("Pipeline error ({}): {}", kind, message);
                (StatusCode::INTERNAL_SERVER_ERROR, *kind, message.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Schema(e) => AppError::SchemaError(e.to_string()),
            other => AppError::PipelineError {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nids_core::logic::error::{ModelLoadError, SchemaError};

    #[test]
    fn test_schema_maps_to_422() {
        let err: AppError = PipelineError::Schema(SchemaError::MissingColumns(vec!["dest_port".into()])).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_model_load_maps_to_500() {
        let err: AppError = PipelineError::ModelLoad(ModelLoadError::NotFound("scaler.json".into())).into();
        match &err {
            AppError::PipelineError { kind, .. } => assert_eq!(*kind, "model_load_error"),
            other => panic!("Expected PipelineError, got {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_maps_to_503() {
        let err = AppError::ConfigError("no input configured".into());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::ValidationError("limit out of range".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
