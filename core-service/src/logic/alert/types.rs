//! Alert Types
//!
//! Core types for the alert feed. Data structures only.

use serde::{Deserialize, Serialize};

use crate::logic::ingest::Observation;
use crate::logic::model::ScoreLabel;

// ============================================================================
// SEVERITY
// ============================================================================

/// Display-facing criticality label
///
/// Model scoring only yields `Low` / `High`. `Medium` is only reachable
/// through field mode, carrying three-level categorical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// ANOMALY → High, NORMAL → Low
    pub fn from_label(label: ScoreLabel) -> Self {
        match label {
            ScoreLabel::Anomaly => Severity::High,
            ScoreLabel::Normal => Severity::Low,
        }
    }

    /// Case-insensitive parse of a categorical severity column
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ALERT
// ============================================================================

/// An observation annotated with its derived severity
///
/// Created once per observation; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(flatten)]
    pub observation: Observation,
    pub severity: Severity,
    /// Scorer output, absent when severity came from the input column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_label: Option<ScoreLabel>,
}

impl Alert {
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.observation.timestamp
    }

    pub fn source(&self) -> Option<&str> {
        self.observation.source.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.observation.destination.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_from_label_is_total() {
        assert_eq!(Severity::from_label(ScoreLabel::Anomaly), Severity::High);
        assert_eq!(Severity::from_label(ScoreLabel::Normal), Severity::Low);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" medium "), Some(Severity::Medium));
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn test_alert_serializes_flat() {
        let alert = Alert {
            observation: Observation::new(Utc::now(), 10, 1, 2, 3).with_endpoints("a", "b"),
            severity: Severity::High,
            score_label: Some(ScoreLabel::Anomaly),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["severity"], "High");
        assert_eq!(json["byte_count"], 10);
        assert_eq!(json["source"], "a");
        assert_eq!(json["score_label"], "ANOMALY");
        assert!(json.get("observation").is_none());
    }
}
