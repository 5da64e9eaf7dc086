//! Pipeline Configuration
//!
//! Can be loaded from a JSON config file or built at runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SCALER_PATH, DEFAULT_SCORER_PATH};
use crate::logic::error::{ModelLoadError, PipelineError, PipelineResult};

// ============================================================================
// SEVERITY SOURCE
// ============================================================================

/// Where an alert's severity comes from, fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeveritySource {
    /// Live model scoring (ANOMALY → High, NORMAL → Low)
    #[default]
    Model,
    /// The observation's own categorical `severity` column
    Field,
}

impl SeveritySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeveritySource::Model => "model",
            SeveritySource::Field => "field",
        }
    }
}

impl std::str::FromStr for SeveritySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(SeveritySource::Model),
            "field" => Ok(SeveritySource::Field),
            other => Err(format!("unknown severity source '{other}' (expected model|field)")),
        }
    }
}

// ============================================================================
// SCORER CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    IsolationForest,
    Onnx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(default)]
    pub kind: ScorerKind,
    pub path: PathBuf,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::IsolationForest,
            path: PathBuf::from(DEFAULT_SCORER_PATH),
        }
    }
}

// ============================================================================
// PIPELINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub severity_source: SeveritySource,
    pub scaler_path: PathBuf,
    pub scorer: ScorerConfig,
    /// Optional integrity manifest checked before artifacts load
    pub manifest_path: Option<PathBuf>,
    /// Score rows on the rayon pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            severity_source: SeveritySource::Model,
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
            scorer: ScorerConfig::default(),
            manifest_path: None,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Severity straight from the input's `severity` column, no model
    pub fn field_mode() -> Self {
        Self {
            severity_source: SeveritySource::Field,
            ..Default::default()
        }
    }

    /// Load from a JSON file; relative artifact paths resolve against the
    /// config file's directory
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let mut config: PipelineConfig =
            serde_json::from_str(&raw).map_err(|e| ModelLoadError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("invalid pipeline config: {e}"),
            })?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }

        log::info!(
            "Pipeline config loaded from {} (severity_source={})",
            path.display(),
            config.severity_source.as_str()
        );
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.scaler_path);
        resolve(&mut self.scorer.path);
        if let Some(manifest) = self.manifest_path.as_mut() {
            resolve(manifest);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.severity_source, SeveritySource::Model);
        assert_eq!(config.scorer.kind, ScorerKind::IsolationForest);
        assert!(config.parallel);
        assert!(config.manifest_path.is_none());
    }

    #[test]
    fn test_field_mode() {
        assert_eq!(PipelineConfig::field_mode().severity_source, SeveritySource::Field);
    }

    #[test]
    fn test_severity_source_from_str() {
        assert_eq!("MODEL".parse::<SeveritySource>().unwrap(), SeveritySource::Model);
        assert_eq!("field".parse::<SeveritySource>().unwrap(), SeveritySource::Field);
        assert!("random".parse::<SeveritySource>().is_err());
    }

    #[test]
    fn test_load_partial_json_and_resolve_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{"severity_source": "model", "scorer": {"kind": "onnx", "path": "m/model.onnx"}, "parallel": false}"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.scorer.kind, ScorerKind::Onnx);
        assert_eq!(config.scorer.path, dir.path().join("m/model.onnx"));
        assert_eq!(config.scaler_path, dir.path().join(DEFAULT_SCALER_PATH));
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{"severity_source": "sometimes"}"#).unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::ModelLoad(_))));
    }
}
