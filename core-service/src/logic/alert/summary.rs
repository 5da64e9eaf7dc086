//! Alert Aggregations
//!
//! Simple reductions over an alert batch for the dashboard: counts by
//! severity, counts by day, top talkers, headline totals. No business
//! logic lives here.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Alert, Severity};

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCount {
    pub address: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTalkers {
    pub sources: Vec<AddressCount>,
    pub destinations: Vec<AddressCount>,
}

/// Headline numbers for the metrics row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Fraction of alerts rated High (0.0 for an empty batch)
    pub high_rate: f64,
    pub unique_sources: usize,
    pub unique_destinations: usize,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

// ============================================================================
// AGGREGATIONS
// ============================================================================

/// Count per severity, most frequent first (ties: higher severity first)
pub fn count_by_severity(alerts: &[Alert]) -> Vec<SeverityCount> {
    let mut counts: HashMap<Severity, usize> = HashMap::new();
    for alert in alerts {
        *counts.entry(alert.severity).or_default() += 1;
    }

    let mut result: Vec<SeverityCount> = counts
        .into_iter()
        .map(|(severity, count)| SeverityCount { severity, count })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then(b.severity.cmp(&a.severity)));
    result
}

/// Alerts per calendar day (UTC), ascending by date
pub fn count_by_date(alerts: &[Alert]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for alert in alerts {
        *counts.entry(alert.timestamp().date_naive()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Top-N addresses by alert count (ties: address ascending); rows without
/// an address are not counted
pub fn top_n<'a>(addresses: impl Iterator<Item = Option<&'a str>>, n: usize) -> Vec<AddressCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for address in addresses.flatten() {
        *counts.entry(address).or_default() += 1;
    }

    let mut result: Vec<AddressCount> = counts
        .into_iter()
        .map(|(address, count)| AddressCount { address: address.to_string(), count })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.address.cmp(&b.address)));
    result.truncate(n);
    result
}

pub fn top_talkers(alerts: &[Alert], n: usize) -> TopTalkers {
    TopTalkers {
        sources: top_n(alerts.iter().map(Alert::source), n),
        destinations: top_n(alerts.iter().map(Alert::destination), n),
    }
}

pub fn summarize(alerts: &[Alert]) -> AlertSummary {
    let count = |s: Severity| alerts.iter().filter(|a| a.severity == s).count();
    let high = count(Severity::High);

    let unique_sources: HashSet<&str> = alerts.iter().filter_map(Alert::source).collect();
    let unique_destinations: HashSet<&str> = alerts.iter().filter_map(Alert::destination).collect();

    AlertSummary {
        total: alerts.len(),
        high,
        medium: count(Severity::Medium),
        low: count(Severity::Low),
        high_rate: if alerts.is_empty() { 0.0 } else { high as f64 / alerts.len() as f64 },
        unique_sources: unique_sources.len(),
        unique_destinations: unique_destinations.len(),
        first_seen: alerts.iter().map(Alert::timestamp).min(),
        last_seen: alerts.iter().map(Alert::timestamp).max(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
