//! Model Performance Metrics
//!
//! Computed only when the input carries a ground-truth `label` column and
//! severities came from the model. ANOMALY is the positive class.

use serde::{Deserialize, Serialize};

use super::types::Alert;
use crate::logic::model::ScoreLabel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Rows with both a prediction and a parseable ground-truth label
    pub evaluated: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Confusion-matrix metrics; None when no row can be evaluated
pub fn evaluate(alerts: &[Alert]) -> Option<ModelMetrics> {
    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);

    for alert in alerts {
        let Some(predicted) = alert.score_label else { continue };
        let Some(actual) = alert
            .observation
            .label
            .as_deref()
            .and_then(ScoreLabel::parse_ground_truth)
        else {
            continue;
        };

        match (predicted, actual) {
            (ScoreLabel::Anomaly, ScoreLabel::Anomaly) => tp += 1,
            (ScoreLabel::Anomaly, ScoreLabel::Normal) => fp += 1,
            (ScoreLabel::Normal, ScoreLabel::Normal) => tn += 1,
            (ScoreLabel::Normal, ScoreLabel::Anomaly) => fn_ += 1,
        }
    }

    let evaluated = tp + fp + tn + fn_;
    if evaluated == 0 {
        return None;
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    Some(ModelMetrics {
        evaluated,
        true_positives: tp,
        false_positives: fp,
        true_negatives: tn,
        false_negatives: fn_,
        accuracy: ratio(tp + tn, evaluated),
        precision,
        recall,
        f1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::alert::materialize;
    use crate::logic::ingest::Observation;
    use chrono::Utc;

    fn scored(predicted: ScoreLabel, truth: Option<&str>) -> Alert {
        let mut obs = Observation::new(Utc::now(), 1, 1, 1, 1);
        obs.label = truth.map(str::to_string);
        materialize(&obs, predicted)
    }

    #[test]
    fn test_evaluate_confusion_matrix() {
        let alerts = vec![
            scored(ScoreLabel::Anomaly, Some("anomaly")),
            scored(ScoreLabel::Anomaly, Some("normal")),
            scored(ScoreLabel::Normal, Some("normal")),
            scored(ScoreLabel::Normal, Some("normal")),
            scored(ScoreLabel::Normal, Some("1")),
            scored(ScoreLabel::Normal, None),
        ];
        let m = evaluate(&alerts).unwrap();

        assert_eq!(m.evaluated, 5);
        assert_eq!((m.true_positives, m.false_positives), (1, 1));
        assert_eq!((m.true_negatives, m.false_negatives), (2, 1));
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 0.5).abs() < 1e-12);
        assert!((m.recall - 0.5).abs() < 1e-12);
        assert!((m.f1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_without_labels() {
        let alerts = vec![scored(ScoreLabel::Anomaly, None)];
        assert!(evaluate(&alerts).is_none());
        assert!(evaluate(&[]).is_none());
    }
}
