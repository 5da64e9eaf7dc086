//! Pipeline Errors
//!
//! Every error here is fatal for the whole batch. There are no per-row
//! recoverable conditions: a batch is either fully scored or not produced.

use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by ingestion, artifact loading and scoring
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required columns/fields missing or wrong type
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Scaler or scorer artifact missing, corrupt or arity-mismatched
    #[error("model load error: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// Zero (or non-finite) scale factor for a feature about to be normalized
    #[error("degenerate scaler: feature '{feature}' (index {index}) has scale {scale}")]
    DegenerateInput {
        index: usize,
        feature: &'static str,
        scale: f64,
    },

    /// The scorer failed at runtime
    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Schema violations in the input batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: invalid value for '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// `severity_source = field` but a row carries no usable severity
    #[error("row {row}: severity field missing or unrecognised ({value:?})")]
    MissingSeverity { row: usize, value: Option<String> },
}

/// Artifact loading failures
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("corrupt artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("arity mismatch in {artifact}: expected {expected} features, got {actual}")]
    ArityMismatch {
        artifact: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature layout mismatch in {artifact}: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("inference runtime error: {0}")]
    Runtime(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io { path: path.into(), source }
    }

    /// Short machine-readable kind, used by API responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Schema(_) => "schema_error",
            PipelineError::ModelLoad(_) => "model_load_error",
            PipelineError::DegenerateInput { .. } => "degenerate_input_error",
            PipelineError::Scoring(_) => "scoring_error",
            PipelineError::Io { .. } => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = PipelineError::from(SchemaError::MissingColumns(vec![
            "dest_port".to_string(),
            "duration".to_string(),
        ]));
        assert_eq!(err.kind(), "schema_error");
        assert!(err.to_string().contains("dest_port, duration"));
    }

    #[test]
    fn test_degenerate_message_names_feature() {
        let err = PipelineError::DegenerateInput { index: 1, feature: "duration", scale: 0.0 };
        assert_eq!(err.kind(), "degenerate_input_error");
        assert!(err.to_string().contains("duration"));
    }
}
