//! Scorer - black-box binary outlier detection capability
//!
//! The pipeline only depends on the two-valued contract: a scaled vector
//! goes in, NORMAL or ANOMALY comes out. Implementations must not let rows
//! interact: `score_batch(rows)[i] == score(rows[i])`.

use serde::{Deserialize, Serialize};

use crate::logic::error::PipelineResult;
use crate::logic::features::ScaledVector;

// ============================================================================
// SCORE LABEL
// ============================================================================

/// Raw scorer output for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreLabel {
    Normal,
    Anomaly,
}

impl ScoreLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Normal => "NORMAL",
            ScoreLabel::Anomaly => "ANOMALY",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, ScoreLabel::Anomaly)
    }

    /// Outlier-detector convention: -1 is an outlier, anything else inlier
    pub fn from_outlier_sign(value: i64) -> Self {
        if value < 0 {
            ScoreLabel::Anomaly
        } else {
            ScoreLabel::Normal
        }
    }

    /// Parse a ground-truth label ("anomaly"/"normal", "1"/"0", "-1")
    pub fn parse_ground_truth(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anomaly" | "attack" | "malicious" | "1" | "-1" | "true" => Some(ScoreLabel::Anomaly),
            "normal" | "benign" | "0" | "false" => Some(ScoreLabel::Normal),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Trait for anomaly scorers (isolation forest, ONNX, ...)
///
/// Loaded once at startup and shared read-only by any number of callers.
pub trait Scorer: Send + Sync {
    /// Human-readable engine name for status output
    fn name(&self) -> &str;

    /// Number of features the model expects
    fn arity(&self) -> usize;

    fn score(&self, vector: &ScaledVector) -> PipelineResult<ScoreLabel>;

    /// Score many rows; default is row-by-row
    fn score_batch(&self, vectors: &[ScaledVector]) -> PipelineResult<Vec<ScoreLabel>> {
        vectors.iter().map(|v| self.score(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlier_sign() {
        assert_eq!(ScoreLabel::from_outlier_sign(-1), ScoreLabel::Anomaly);
        assert_eq!(ScoreLabel::from_outlier_sign(1), ScoreLabel::Normal);
        assert_eq!(ScoreLabel::from_outlier_sign(0), ScoreLabel::Normal);
        assert!(ScoreLabel::from_outlier_sign(-1).is_anomaly());
        assert!(!ScoreLabel::from_outlier_sign(1).is_anomaly());
    }

    #[test]
    fn test_parse_ground_truth() {
        assert_eq!(ScoreLabel::parse_ground_truth(" Anomaly "), Some(ScoreLabel::Anomaly));
        assert_eq!(ScoreLabel::parse_ground_truth("0"), Some(ScoreLabel::Normal));
        assert_eq!(ScoreLabel::parse_ground_truth("maybe"), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&ScoreLabel::Anomaly).unwrap(), "\"ANOMALY\"");
        assert_eq!(ScoreLabel::Normal.to_string(), "NORMAL");
    }
}
