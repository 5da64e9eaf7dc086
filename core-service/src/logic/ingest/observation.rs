//! Observation - one raw network-flow record
//!
//! Immutable once ingested. Optional columns are carried forward untouched
//! onto the resulting alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One network-flow record as read from the input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub byte_count: u64,
    /// Seconds
    pub duration: u64,
    pub source_port: u16,
    pub dest_port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Pre-existing categorical severity column (only used in field mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Ground-truth label, when the input is a labeled evaluation set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Observation {
    /// Minimal observation with only the required fields
    pub fn new(
        timestamp: DateTime<Utc>,
        byte_count: u64,
        duration: u64,
        source_port: u16,
        dest_port: u16,
    ) -> Self {
        Self {
            timestamp,
            byte_count,
            duration,
            source_port,
            dest_port,
            source: None,
            destination: None,
            reported_severity: None,
            alert_type: None,
            category: None,
            label: None,
        }
    }

    pub fn with_endpoints(mut self, source: impl Into<String>, destination: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.destination = Some(destination.into());
        self
    }

    pub fn with_reported_severity(mut self, severity: impl Into<String>) -> Self {
        self.reported_severity = Some(severity.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
