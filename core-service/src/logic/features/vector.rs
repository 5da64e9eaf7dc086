//! Feature Vector - Core data structure for model input
//!
//! Values follow `FEATURE_LAYOUT` order. The order must match what the
//! scaler and scorer were fitted with; the pipeline cannot check that at
//! runtime, only the layout hash / feature names of the artifacts.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;
use crate::logic::ingest::Observation;

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Raw (unscaled) feature values of one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Select and order the numeric fields of an observation
    pub fn extract(observation: &Observation) -> Self {
        Self {
            values: [
                observation.byte_count as f64,
                observation.duration as f64,
                f64::from(observation.source_port),
                f64::from(observation.dest_port),
            ],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

/// Feature vector after per-feature centering/scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledVector {
    pub values: [f64; FEATURE_COUNT],
}

impl ScaledVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// One row of a scaled `(n, FEATURE_COUNT)` matrix
    pub fn from_row(row: ArrayView1<'_, f64>) -> Self {
        let mut values = [0.0f64; FEATURE_COUNT];
        for (value, x) in values.iter_mut().zip(row.iter()) {
            *value = *x;
        }
        Self { values }
    }

    /// Single-precision copy for runtimes that take f32 tensors
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }
}

/// `extract(observation) -> FeatureVector`
pub fn extract(observation: &Observation) -> FeatureVector {
    FeatureVector::extract(observation)
}

/// Raw features of a whole batch as an `(n, FEATURE_COUNT)` matrix
pub fn extract_matrix(observations: &[Observation]) -> Array2<f64> {
    let rows: Vec<FeatureVector> = observations.iter().map(extract).collect();
    Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i].values[j])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_extract_order() {
        let obs = Observation::new(Utc::now(), 50_000, 1, 51_000, 443);
        let vector = extract(&obs);

        assert_eq!(vector.values, [50_000.0, 1.0, 51_000.0, 443.0]);
    }

    #[test]
    fn test_extract_matrix_rows_follow_batch() {
        let ts = Utc::now();
        let batch = vec![Observation::new(ts, 10, 2, 3, 4), Observation::new(ts, 50_000, 1, 51_000, 443)];
        let matrix = extract_matrix(&batch);

        assert_eq!(matrix.dim(), (2, FEATURE_COUNT));
        for (row, obs) in matrix.rows().into_iter().zip(&batch) {
            assert_eq!(row.to_vec(), extract(obs).values.to_vec());
        }
        assert_eq!(extract_matrix(&[]).dim(), (0, FEATURE_COUNT));
    }

    #[test]
    fn test_extract_ignores_optional_fields() {
        let ts = Utc::now();
        let bare = Observation::new(ts, 10, 2, 3, 4);
        let rich = bare.clone().with_endpoints("10.0.0.1", "10.0.0.2").with_label("normal");
        assert_eq!(extract(&bare), extract(&rich));
    }

    #[test]
    fn test_scaled_to_f32() {
        let scaled = ScaledVector { values: [0.5, -1.25, 0.0, 2.0] };
        assert_eq!(scaled.to_f32(), [0.5f32, -1.25, 0.0, 2.0]);
    }

    #[test]
    fn test_scaled_from_row() {
        let row = ndarray::arr1(&[0.5, -1.25, 0.0, 2.0]);
        assert_eq!(ScaledVector::from_row(row.view()).values, [0.5, -1.25, 0.0, 2.0]);
    }
}
