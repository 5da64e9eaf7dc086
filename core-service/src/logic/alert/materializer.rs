//! Alert Materializer
//!
//! Joins scorer output back onto the observation. The observation is copied
//! forward untouched; batch order is preserved, nothing is deduplicated.

use rayon::prelude::*;

use super::types::{Alert, Severity};
use crate::logic::error::{PipelineError, PipelineResult, SchemaError};
use crate::logic::ingest::Observation;
use crate::logic::model::ScoreLabel;

/// `materialize(observation, label) -> Alert`
pub fn materialize(observation: &Observation, label: ScoreLabel) -> Alert {
    Alert {
        observation: observation.clone(),
        severity: Severity::from_label(label),
        score_label: Some(label),
    }
}

/// Field mode: severity taken from the observation's own column
///
/// `row` is 1-based and only used for the error.
pub fn materialize_from_field(observation: &Observation, row: usize) -> Result<Alert, SchemaError> {
    let severity = observation
        .reported_severity
        .as_deref()
        .and_then(Severity::parse)
        .ok_or_else(|| SchemaError::MissingSeverity {
            row,
            value: observation.reported_severity.clone(),
        })?;

    Ok(Alert {
        observation: observation.clone(),
        severity,
        score_label: None,
    })
}

/// Pairwise materialization over a scored batch, order-preserving
///
/// A label count that differs from the row count fails the whole batch.
pub fn materialize_batch(observations: &[Observation], labels: &[ScoreLabel]) -> PipelineResult<Vec<Alert>> {
    if observations.len() != labels.len() {
        return Err(PipelineError::Scoring(format!(
            "scorer returned {} labels for {} observations",
            labels.len(),
            observations.len()
        )));
    }

    Ok(observations
        .par_iter()
        .zip(labels.par_iter())
        .map(|(obs, label)| materialize(obs, *label))
        .collect())
}
