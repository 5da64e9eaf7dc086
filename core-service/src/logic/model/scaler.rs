//! Scaler - fitted mean/variance normalization
//!
//! `scaled[i] = (raw[i] - mean[i]) / scale[i]`
//!
//! Parameters come from an external fitting process and are read-only
//! after load. A zero scale is a training-time defect; it is reported as
//! a degenerate-input error before anything is scored.

use std::path::Path;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::logic::error::{ModelLoadError, PipelineError, PipelineResult};
use crate::logic::features::layout::{feature_name, matches_layout, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::features::{FeatureVector, ScaledVector};

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// On-disk scaler parameters (a fitted standard scaler's `mean_` / `scale_`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Feature order the scaler was fitted with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

// ============================================================================
// SCALER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl Scaler {
    /// Build from fitted vectors; arity must equal the feature count
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelLoadError> {
        let mean: [f64; FEATURE_COUNT] = mean.try_into().map_err(|v: Vec<f64>| {
            ModelLoadError::ArityMismatch {
                artifact: "scaler.mean".to_string(),
                expected: FEATURE_COUNT,
                actual: v.len(),
            }
        })?;
        let scale: [f64; FEATURE_COUNT] = scale.try_into().map_err(|v: Vec<f64>| {
            ModelLoadError::ArityMismatch {
                artifact: "scaler.scale".to_string(),
                expected: FEATURE_COUNT,
                actual: v.len(),
            }
        })?;

        Ok(Self { mean, scale })
    }

    pub fn from_params(params: ScalerParams) -> Result<Self, ModelLoadError> {
        if let Some(names) = &params.feature_names {
            if !matches_layout(names) {
                return Err(ModelLoadError::LayoutMismatch {
                    artifact: "scaler".to_string(),
                    expected: FEATURE_LAYOUT.join(","),
                    actual: names.join(","),
                });
            }
        }
        Self::new(params.mean, params.scale)
    }

    /// Load scaler parameters from a JSON artifact
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        log::info!("Loading scaler from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let params: ScalerParams = serde_json::from_str(&raw).map_err(|e| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_params(params)
    }

    pub fn mean(&self) -> &[f64; FEATURE_COUNT] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }

    pub fn params(&self) -> ScalerParams {
        ScalerParams {
            mean: self.mean.to_vec(),
            scale: self.scale.to_vec(),
            feature_names: Some(FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Fail on the first zero or non-finite scale factor
    pub fn check_degenerate(&self) -> PipelineResult<()> {
        match self.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            Some(index) => Err(PipelineError::DegenerateInput {
                index,
                feature: feature_name(index),
                scale: self.scale[index],
            }),
            None => Ok(()),
        }
    }

    /// Pure per-feature normalization
    ///
    /// Callers are expected to have run [`Scaler::check_degenerate`]; the
    /// pipeline does so once per batch before scoring.
    pub fn transform(&self, vector: &FeatureVector) -> ScaledVector {
        let mut values = [0.0f64; FEATURE_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            *value = (vector.values[i] - self.mean[i]) / self.scale[i];
        }
        ScaledVector { values }
    }

    /// [`Scaler::transform`] over every row of an `(n, FEATURE_COUNT)` matrix
    ///
    /// Same arithmetic per element, so row `i` equals `transform` of row `i`.
    pub fn transform_matrix(&self, matrix: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        if matrix.ncols() != FEATURE_COUNT {
            return Err(PipelineError::Scoring(format!(
                "feature matrix has {} columns, expected {}",
                matrix.ncols(),
                FEATURE_COUNT
            )));
        }

        let mean = ArrayView1::from(&self.mean[..]);
        let scale = ArrayView1::from(&self.scale[..]);
        Ok((matrix - &mean) / &scale)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> Scaler {
        Scaler::new(vec![1000.0, 30.0, 50000.0, 500.0], vec![2000.0, 20.0, 8000.0, 1000.0]).unwrap()
    }

    #[test]
    fn test_transform_of_mean_is_zero() {
        let s = scaler();
        let scaled = s.transform(&FeatureVector::from_values(*s.mean()));
        assert_eq!(scaled.values, [0.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_transform_formula() {
        let s = scaler();
        let scaled = s.transform(&FeatureVector::from_values([5000.0, 10.0, 58000.0, 0.0]));
        assert_eq!(scaled.values, [2.0, -1.0, 1.0, -0.5]);
    }

    #[test]
    fn test_transform_is_pure() {
        let s = scaler();
        let v = FeatureVector::from_values([123.0, 4.0, 5.0, 6.0]);
        assert_eq!(s.transform(&v), s.transform(&v));
    }

    #[test]
    fn test_arity_mismatch() {
        let result = Scaler::new(vec![0.0; 3], vec![1.0; 4]);
        match result {
            Err(ModelLoadError::ArityMismatch { expected, actual, .. }) => {
                assert_eq!(expected, FEATURE_COUNT);
                assert_eq!(actual, 3);
            }
            other => panic!("Expected ArityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_scale_is_degenerate() {
        let s = Scaler::new(vec![0.0; 4], vec![1.0, 0.0, 1.0, 1.0]).unwrap();
        match s.check_degenerate() {
            Err(PipelineError::DegenerateInput { index, feature, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(feature, "duration");
            }
            other => panic!("Expected DegenerateInput, got {other:?}"),
        }
    }

    #[test]
    fn test_transform_matrix_matches_rows() {
        let s = scaler();
        let rows = [
            [5000.0, 10.0, 58000.0, 0.0],
            [1000.0, 30.0, 50000.0, 500.0],
            [50_000.0, 1.0, 51_000.0, 443.0],
        ];
        let matrix = Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i][j]);
        let scaled = s.transform_matrix(&matrix).unwrap();

        assert_eq!(scaled.dim(), (3, FEATURE_COUNT));
        for (i, row) in rows.iter().enumerate() {
            let expected = s.transform(&FeatureVector::from_values(*row));
            assert_eq!(scaled.row(i).to_vec(), expected.values.to_vec());
        }
    }

    #[test]
    fn test_transform_matrix_rejects_wrong_width() {
        let matrix = Array2::<f64>::zeros((2, 3));
        assert!(matches!(scaler().transform_matrix(&matrix), Err(PipelineError::Scoring(_))));
    }

    #[test]
    fn test_nan_scale_is_degenerate() {
        let s = Scaler::new(vec![0.0; 4], vec![1.0, 1.0, f64::NAN, 1.0]).unwrap();
        assert!(s.check_degenerate().is_err());
    }

    #[test]
    fn test_feature_names_must_match_layout() {
        let params = ScalerParams {
            mean: vec![0.0; 4],
            scale: vec![1.0; 4],
            feature_names: Some(vec![
                "duration".into(), "byte_count".into(), "source_port".into(), "dest_port".into(),
            ]),
        };
        assert!(matches!(
            Scaler::from_params(params),
            Err(ModelLoadError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let original = scaler();
        std::fs::write(&path, serde_json::to_string(&original.params()).unwrap()).unwrap();

        assert_eq!(Scaler::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        assert!(matches!(Scaler::load(&missing), Err(ModelLoadError::NotFound(_))));

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(matches!(Scaler::load(&corrupt), Err(ModelLoadError::Corrupt { .. })));
    }
}
