//! Isolation Forest - native evaluation of an exported forest
//!
//! Reads a JSON export of a fitted isolation forest and evaluates it the
//! same way the fitting library does:
//!
//! - path length `h(x) = depth(leaf) + c(leaf.size)`
//! - anomaly score `s = 2^(-mean(h) / c(max_samples))`
//! - outlier iff `-s - offset < 0`
//!
//! Splits send `x[feature] <= threshold` left.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::scorer::{ScoreLabel, Scorer};
use crate::logic::error::{ModelLoadError, PipelineResult};
use crate::logic::features::{ScaledVector, FEATURE_COUNT};

/// Euler–Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Offset the fitting library uses when contamination is "auto"
pub const DEFAULT_OFFSET: f64 = -0.5;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Training samples that reached this leaf
        size: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    /// Sub-sample size each tree was grown on
    pub max_samples: usize,
    #[serde(default = "default_offset")]
    pub offset: f64,
    pub trees: Vec<Tree>,
}

fn default_offset() -> f64 {
    DEFAULT_OFFSET
}

// ============================================================================
// PATH LENGTH
// ============================================================================

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

impl Tree {
    /// Path length of `x` in this tree (depth + leaf correction)
    fn path_length(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;

        // validate() guarantees child indices move strictly forward
        loop {
            match &self.nodes[index] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split { feature, threshold, left, right } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }

    fn validate(&self, tree_index: usize, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree_index} has no nodes"));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, threshold, left, right } = node {
                if *feature >= n_features {
                    return Err(format!("tree {tree_index} node {i}: feature {feature} out of range"));
                }
                if !threshold.is_finite() {
                    return Err(format!("tree {tree_index} node {i}: non-finite threshold"));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("tree {tree_index} node {i}: invalid child index {child}"));
                    }
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// SCORER
// ============================================================================

#[derive(Debug, Clone)]
pub struct IsolationForestScorer {
    model: ForestModel,
    normalizer: f64,
}

impl IsolationForestScorer {
    pub fn new(model: ForestModel) -> Result<Self, ModelLoadError> {
        Self::validate(&model).map_err(|reason| ModelLoadError::Corrupt {
            path: "<isolation_forest>".into(),
            reason,
        })?;

        if model.n_features != FEATURE_COUNT {
            return Err(ModelLoadError::ArityMismatch {
                artifact: "isolation_forest".to_string(),
                expected: FEATURE_COUNT,
                actual: model.n_features,
            });
        }

        let normalizer = average_path_length(model.max_samples);
        Ok(Self { model, normalizer })
    }

    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        log::info!("Loading isolation forest from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model: ForestModel = serde_json::from_str(&raw).map_err(|e| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let scorer = Self::new(model).map_err(|e| match e {
            ModelLoadError::Corrupt { reason, .. } => ModelLoadError::Corrupt {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        log::info!(
            "Isolation forest loaded: {} trees, max_samples={}",
            scorer.model.trees.len(),
            scorer.model.max_samples
        );
        Ok(scorer)
    }

    fn validate(model: &ForestModel) -> Result<(), String> {
        if model.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if model.max_samples < 2 {
            return Err(format!("max_samples must be >= 2, got {}", model.max_samples));
        }
        if !model.offset.is_finite() {
            return Err("non-finite offset".to_string());
        }
        model
            .trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(i, model.n_features))
    }

    /// Anomaly score in (0, 1]; higher is more isolated
    pub fn anomaly_score(&self, vector: &ScaledVector) -> f64 {
        let x = vector.as_slice();
        let total: f64 = self.model.trees.iter().map(|t| t.path_length(x)).sum();
        let mean_path = total / self.model.trees.len() as f64;
        2f64.powf(-mean_path / self.normalizer)
    }

    /// `-s - offset`; negative means outlier
    pub fn decision_function(&self, vector: &ScaledVector) -> f64 {
        -self.anomaly_score(vector) - self.model.offset
    }
}

impl Scorer for IsolationForestScorer {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn arity(&self) -> usize {
        self.model.n_features
    }

    fn score(&self, vector: &ScaledVector) -> PipelineResult<ScoreLabel> {
        Ok(if self.decision_function(vector) < 0.0 {
            ScoreLabel::Anomaly
        } else {
            ScoreLabel::Normal
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One split on scaled byte_count: the bulk stays left, outliers isolate right
    pub(crate) fn byte_count_forest() -> ForestModel {
        ForestModel {
            n_features: FEATURE_COUNT,
            max_samples: 256,
            offset: DEFAULT_OFFSET,
            trees: vec![Tree {
                nodes: vec![
                    Node::Split { feature: 0, threshold: 3.0, left: 1, right: 2 },
                    Node::Leaf { size: 255 },
                    Node::Leaf { size: 1 },
                ],
            }],
        }
    }

    fn scaled(values: [f64; FEATURE_COUNT]) -> ScaledVector {
        ScaledVector { values }
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!((c256 - 10.2448).abs() < 1e-3, "c(256) = {c256}");
    }

    #[test]
    fn test_isolated_point_is_anomaly() {
        let scorer = IsolationForestScorer::new(byte_count_forest()).unwrap();

        let outlier = scaled([24.5, -1.4, 0.0, 0.0]);
        assert_eq!(scorer.score(&outlier).unwrap(), ScoreLabel::Anomaly);
        assert!(scorer.anomaly_score(&outlier) > 0.9);

        let inlier = scaled([0.1, 0.2, 0.0, 0.0]);
        assert_eq!(scorer.score(&inlier).unwrap(), ScoreLabel::Normal);
        assert!(scorer.anomaly_score(&inlier) < 0.5);
    }

    #[test]
    fn test_split_boundary_goes_left() {
        let scorer = IsolationForestScorer::new(byte_count_forest()).unwrap();
        assert_eq!(scorer.score(&scaled([3.0, 0.0, 0.0, 0.0])).unwrap(), ScoreLabel::Normal);
    }

    #[test]
    fn test_batch_equals_rows() {
        let scorer = IsolationForestScorer::new(byte_count_forest()).unwrap();
        let rows = vec![
            scaled([10.0, 0.0, 0.0, 0.0]),
            scaled([0.0, 0.0, 0.0, 0.0]),
            scaled([5.0, 1.0, 1.0, 1.0]),
        ];
        let batch = scorer.score_batch(&rows).unwrap();
        for (row, label) in rows.iter().zip(batch) {
            assert_eq!(scorer.score(row).unwrap(), label);
        }
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let mut model = byte_count_forest();
        model.n_features = 3;
        assert!(matches!(
            IsolationForestScorer::new(model),
            Err(ModelLoadError::ArityMismatch { actual: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut model = byte_count_forest();
        model.trees[0].nodes[0] = Node::Split { feature: 0, threshold: 1.0, left: 0, right: 2 };
        assert!(matches!(IsolationForestScorer::new(model), Err(ModelLoadError::Corrupt { .. })));
    }

    #[test]
    fn test_rejects_feature_out_of_range() {
        let mut model = byte_count_forest();
        model.trees[0].nodes[0] = Node::Split { feature: 9, threshold: 1.0, left: 1, right: 2 };
        assert!(matches!(IsolationForestScorer::new(model), Err(ModelLoadError::Corrupt { .. })));
    }

    #[test]
    fn test_rejects_empty_forest() {
        let mut model = byte_count_forest();
        model.trees.clear();
        assert!(matches!(IsolationForestScorer::new(model), Err(ModelLoadError::Corrupt { .. })));
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        let json = r#"{
            "n_features": 4,
            "max_samples": 256,
            "trees": [{ "nodes": [
                { "split": { "feature": 0, "threshold": 3.0, "left": 1, "right": 2 } },
                { "leaf": { "size": 255 } },
                { "leaf": { "size": 1 } }
            ]}]
        }"#;
        std::fs::write(&path, json).unwrap();

        let scorer = IsolationForestScorer::load(&path).unwrap();
        assert_eq!(scorer.arity(), FEATURE_COUNT);
        assert_eq!(scorer.score(&scaled([24.5, 0.0, 0.0, 0.0])).unwrap(), ScoreLabel::Anomaly);
    }

    #[test]
    fn test_load_corrupt_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(&path, r#"{"n_features": 4, "max_samples": 256, "trees": []}"#).unwrap();

        match IsolationForestScorer::load(&path) {
            Err(ModelLoadError::Corrupt { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Corrupt, got {other:?}"),
        }
    }
}
