//! Detailed Data Summary
//!
//! Per numeric column: count, mean, sample std, min, quartiles, max.
//! Quartiles use linear interpolation between closest ranks.

use serde::{Deserialize, Serialize};

use super::types::Alert;
use crate::logic::features::{extract, FEATURE_LAYOUT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); None below two rows
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                column: column.to_string(),
                count,
                mean: None,
                std: None,
                min: None,
                p25: None,
                p50: None,
                p75: None,
                max: None,
            };
        }

        values.sort_by(f64::total_cmp);
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        });

        Self {
            column: column.to_string(),
            count,
            mean: Some(mean),
            std,
            min: values.first().copied(),
            p25: Some(quantile_sorted(&values, 0.25)),
            p50: Some(quantile_sorted(&values, 0.50)),
            p75: Some(quantile_sorted(&values, 0.75)),
            max: values.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of a non-empty sorted slice
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Stats for each numeric feature column, in layout order
pub fn describe(alerts: &[Alert]) -> Vec<ColumnStats> {
    let vectors: Vec<_> = alerts.iter().map(|a| extract(&a.observation)).collect();

    FEATURE_LAYOUT
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnStats::from_values(name, vectors.iter().map(|v| v.values[i]).collect()))
        .collect()
}
