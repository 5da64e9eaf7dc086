//! Inference Engine - ONNX Runtime Integration
//!
//! Runs an exported outlier detector through ONNX Runtime. The first model
//! output is read as labels: negative means outlier (-1), anything else
//! inlier.
//!
//! A session run needs exclusive access, so the session sits behind a
//! mutex; the scorer itself is still shared freely across threads.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::scorer::{ScoreLabel, Scorer};
use crate::logic::error::{ModelLoadError, PipelineError, PipelineResult};
use crate::logic::features::{ScaledVector, FEATURE_COUNT};

// ============================================================================
// ONNX SCORER
// ============================================================================

pub struct OnnxScorer {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl std::fmt::Debug for OnnxScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxScorer")
            .field("model_path", &self.model_path)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl OnnxScorer {
    /// Load ONNX model from file and check its input arity with a zero row
    pub fn load(model_path: &Path) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to set optimization: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::Corrupt {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelLoadError::Corrupt {
                path: model_path.to_path_buf(),
                reason: "model defines no outputs".to_string(),
            })?;

        let scorer = Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.display().to_string(),
        };

        // A model fitted on another feature count rejects this run
        scorer
            .run(&[ScaledVector { values: [0.0; FEATURE_COUNT] }])
            .map_err(|e| unusable_model(model_path, &e))?;

        log::info!("ONNX model loaded successfully");
        Ok(scorer)
    }

    /// One session run over an `(n, FEATURE_COUNT)` f32 tensor
    fn run(&self, vectors: &[ScaledVector]) -> PipelineResult<Vec<ScoreLabel>> {
        let mut input_data = Vec::with_capacity(vectors.len() * FEATURE_COUNT);
        for vector in vectors {
            input_data.extend_from_slice(&vector.to_f32());
        }

        let input_array = Array2::<f32>::from_shape_vec((vectors.len(), FEATURE_COUNT), input_data)
            .map_err(|e| PipelineError::Scoring(format!("Array error: {e}")))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PipelineError::Scoring(format!("Tensor error: {e}")))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PipelineError::Scoring(format!("Inference failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| PipelineError::Scoring("No output".to_string()))?;

        let labels: Vec<ScoreLabel> = if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            data.iter().map(|&v| ScoreLabel::from_outlier_sign(v)).collect()
        } else {
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Scoring(format!("Extract error: {e}")))?;
            data.iter()
                .map(|&v| if v < 0.0 { ScoreLabel::Anomaly } else { ScoreLabel::Normal })
                .collect()
        };

        if labels.len() != vectors.len() {
            return Err(PipelineError::Scoring(format!(
                "model returned {} labels for {} rows",
                labels.len(),
                vectors.len()
            )));
        }

        Ok(labels)
    }
}

impl Scorer for OnnxScorer {
    fn name(&self) -> &str {
        "onnx"
    }

    fn arity(&self) -> usize {
        FEATURE_COUNT
    }

    fn score(&self, vector: &ScaledVector) -> PipelineResult<ScoreLabel> {
        self.run(std::slice::from_ref(vector))?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Scoring("empty model output".to_string()))
    }

    /// One tensor for the whole batch; the detector scores rows independently
    fn score_batch(&self, vectors: &[ScaledVector]) -> PipelineResult<Vec<ScoreLabel>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        self.run(vectors)
    }
}

/// A model that loads but cannot score a `FEATURE_COUNT`-wide row
fn unusable_model(model_path: &Path, err: &PipelineError) -> ModelLoadError {
    ModelLoadError::Corrupt {
        path: model_path.to_path_buf(),
        reason: format!("test run on a {FEATURE_COUNT}-feature row failed: {err}"),
    }
}
