//! Synthetic Flows - explicit demo data
//!
//! Only produced on request (CLI `synthetic` command, or an explicit server
//! setting). Never used as a silent stand-in for a missing input file.
//! Generated rows still go through the real scoring pipeline.

use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::observation::Observation;
use crate::logic::error::{PipelineError, PipelineResult};

const SOURCES: &[&str] = &["192.168.1.1", "192.168.1.2", "10.0.0.1", "10.0.0.2"];
const DESTINATIONS: &[&str] = &["192.168.1.3", "192.168.1.4", "10.0.0.3", "10.0.0.4"];
const SERVICE_PORTS: &[u16] = &[22, 53, 80, 443, 3389, 8080];

/// Probability that a generated flow is a burst (large payload, ~1s)
const BURST_RATE: f64 = 0.08;

/// Generator settings
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub rows: usize,
    pub seed: u64,
    pub start: DateTime<Utc>,
    /// Spacing between consecutive flows
    pub step: Duration,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: crate::constants::DEFAULT_SYNTHETIC_ROWS,
            seed: 42,
            start: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            step: Duration::hours(1),
        }
    }
}

/// Generate a deterministic batch of flows for the given seed
pub fn generate(config: &SyntheticConfig) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    (0..config.rows)
        .map(|i| {
            let timestamp = config.start + config.step * i as i32;
            let burst = rng.gen_bool(BURST_RATE);

            let (byte_count, duration) = if burst {
                (rng.gen_range(40_000..60_000), rng.gen_range(0..=2))
            } else {
                (rng.gen_range(200..4_000), rng.gen_range(1..120))
            };

            let source = SOURCES.choose(&mut rng).copied().unwrap_or(SOURCES[0]);
            let destination = DESTINATIONS.choose(&mut rng).copied().unwrap_or(DESTINATIONS[0]);
            let dest_port = SERVICE_PORTS.choose(&mut rng).copied().unwrap_or(443);

            Observation::new(
                timestamp,
                byte_count,
                duration,
                rng.gen_range(49_152..=65_535),
                dest_port,
            )
            .with_endpoints(source, destination)
            .with_label(if burst { "anomaly" } else { "normal" })
        })
        .collect()
}

/// Write observations in the ingestion CSV layout
pub fn write_csv(observations: &[Observation], destination: &Path) -> PipelineResult<usize> {
    let mut writer = csv::Writer::from_path(destination)
        .map_err(|e| PipelineError::io(destination, std::io::Error::from(e)))?;

    writer
        .write_record([
            "timestamp", "byte_count", "duration", "source_port", "dest_port",
            "source", "destination", "label",
        ])
        .map_err(|e| PipelineError::io(destination, std::io::Error::from(e)))?;

    for obs in observations {
        writer
            .write_record([
                obs.timestamp.to_rfc3339(),
                obs.byte_count.to_string(),
                obs.duration.to_string(),
                obs.source_port.to_string(),
                obs.dest_port.to_string(),
                obs.source.clone().unwrap_or_default(),
                obs.destination.clone().unwrap_or_default(),
                obs.label.clone().unwrap_or_default(),
            ])
            .map_err(|e| PipelineError::io(destination, std::io::Error::from(e)))?;
    }

    writer.flush().map_err(|e| PipelineError::io(destination, e))?;
    Ok(observations.len())
}
