//! Alert table query: filter, sort, paginate

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use nids_core::logic::ingest::csv_source::parse_timestamp;
use nids_core::{Alert, Severity};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppError, AppResult};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Timestamp,
    ByteCount,
    Duration,
    SourcePort,
    DestPort,
    Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Raw query string for `GET /api/v1/alerts`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AlertQuery {
    pub severity: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub alert_type: Option<String>,
    /// Inclusive lower bound on timestamp
    pub from: Option<String>,
    /// Inclusive upper bound on timestamp; a bare date covers that whole day
    pub to: Option<String>,
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub order: SortOrder,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Parsed row predicate
#[derive(Debug, Default, Clone)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub alert_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let obs = &alert.observation;

        self.severity.map_or(true, |s| alert.severity == s)
            && self.source.as_deref().map_or(true, |s| obs.source.as_deref() == Some(s))
            && self.destination.as_deref().map_or(true, |d| obs.destination.as_deref() == Some(d))
            && self.alert_type.as_deref().map_or(true, |t| obs.alert_type.as_deref() == Some(t))
            && self.from.map_or(true, |from| obs.timestamp >= from)
            && self.to.map_or(true, |to| obs.timestamp <= to)
    }
}

/// One page of the alert table
#[derive(Debug, Serialize)]
pub struct AlertPage {
    /// Matches before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub alerts: Vec<Alert>,
}

fn parse_bound(name: &str, raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    raw.map(|value| {
        parse_timestamp(value).ok_or_else(|| {
            AppError::ValidationError(format!("invalid '{name}' timestamp: {value:?}"))
        })
    })
    .transpose()
}

/// Upper bound: `2023-01-01` means up to the last instant of that day
fn parse_upper_bound(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    let end_of_day = raw
        .and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_nano_opt(23, 59, 59, 999_999_999))
        .map(|end| end.and_utc());

    match end_of_day {
        Some(end) => Ok(Some(end)),
        None => parse_bound("to", raw),
    }
}

fn compare(a: &Alert, b: &Alert, field: SortField) -> Ordering {
    let (x, y) = (&a.observation, &b.observation);
    match field {
        SortField::Timestamp => x.timestamp.cmp(&y.timestamp),
        SortField::ByteCount => x.byte_count.cmp(&y.byte_count),
        SortField::Duration => x.duration.cmp(&y.duration),
        SortField::SourcePort => x.source_port.cmp(&y.source_port),
        SortField::DestPort => x.dest_port.cmp(&y.dest_port),
        SortField::Severity => a.severity.cmp(&b.severity),
    }
}

impl AlertQuery {
    pub fn filter(&self) -> AppResult<AlertFilter> {
        self.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let severity = self
            .severity
            .as_deref()
            .map(|raw| {
                Severity::parse(raw).ok_or_else(|| {
                    AppError::ValidationError(format!("unknown severity {raw:?} (expected Low, Medium or High)"))
                })
            })
            .transpose()?;

        let filter = AlertFilter {
            severity,
            source: self.source.clone(),
            destination: self.destination.clone(),
            alert_type: self.alert_type.clone(),
            from: parse_bound("from", self.from.as_deref())?,
            to: parse_upper_bound(self.to.as_deref())?,
        };

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(AppError::ValidationError("'from' is after 'to'".to_string()));
            }
        }

        Ok(filter)
    }

    /// Filter, stable-sort and slice a batch; batch order is kept when
    /// no sort field is given
    pub fn apply(&self, alerts: &[Alert]) -> AppResult<AlertPage> {
        let filter = self.filter()?;
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0);

        let mut matched: Vec<&Alert> = alerts.iter().filter(|a| filter.matches(a)).collect();

        if let Some(field) = self.sort_by {
            matched.sort_by(|a, b| {
                let ord = compare(a, b, field);
                match self.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = matched.len();
        let alerts = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(AlertPage { total, offset, limit, alerts })
    }
}
