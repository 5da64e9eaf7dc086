//! Alert Exporter
//!
//! Writes a materialized batch for the presentation layer or offline
//! analysis. The destination is only created once the batch exists, so a
//! failed run never leaves a partially scored file behind.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::types::Alert;
use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// EXPORT FORMATS
// ============================================================================

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Pretty JSON array (default)
    #[default]
    JsonArray,
    /// JSONL (one JSON per line)
    Jsonl,
    /// CSV for spreadsheet analysis
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::JsonArray),
            "jsonl" => Ok(ExportFormat::Jsonl),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown format '{other}' (expected json|jsonl|csv)")),
        }
    }
}

const CSV_HEADER: &[&str] = &[
    "timestamp", "byte_count", "duration", "source_port", "dest_port",
    "source", "destination", "alert_type", "category", "severity",
];

// ============================================================================
// EXPORT FUNCTIONS
// ============================================================================

/// Serialize alerts into any writer
pub fn write_alerts<W: Write>(alerts: &[Alert], mut out: W, format: ExportFormat) -> std::io::Result<usize> {
    match format {
        ExportFormat::Jsonl => {
            for alert in alerts {
                serde_json::to_writer(&mut out, alert)?;
                writeln!(out)?;
            }
        }
        ExportFormat::JsonArray => {
            serde_json::to_writer_pretty(&mut out, alerts)?;
            writeln!(out)?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            writer.write_record(CSV_HEADER).map_err(std::io::Error::from)?;

            for alert in alerts {
                let obs = &alert.observation;
                writer
                    .write_record([
                        obs.timestamp.to_rfc3339(),
                        obs.byte_count.to_string(),
                        obs.duration.to_string(),
                        obs.source_port.to_string(),
                        obs.dest_port.to_string(),
                        obs.source.clone().unwrap_or_default(),
                        obs.destination.clone().unwrap_or_default(),
                        obs.alert_type.clone().unwrap_or_default(),
                        obs.category.clone().unwrap_or_default(),
                        alert.severity.as_str().to_string(),
                    ])
                    .map_err(std::io::Error::from)?;
            }
            writer.flush()?;
        }
    }

    out.flush()?;
    Ok(alerts.len())
}

/// Export alerts to a file
///
/// Written to a temp file beside `destination` and renamed into place on
/// success; on any error `destination` is left as it was.
pub fn export_alerts(alerts: &[Alert], destination: &Path, format: ExportFormat) -> PipelineResult<usize> {
    let count = write_atomically(destination, |out| write_alerts(alerts, out, format))?;
    log::info!("Exported {} alerts to {}", count, destination.display());
    Ok(count)
}

fn write_atomically<F>(destination: &Path, write: F) -> PipelineResult<usize>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> std::io::Result<usize>,
{
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |e| PipelineError::io(destination, e);

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    let count = {
        let mut out = BufWriter::new(&mut tmp);
        let count = write(&mut out).map_err(io_err)?;
        out.into_inner().map_err(|e| io_err(e.into_error()))?;
        count
    };

    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(destination).map_err(|e| io_err(e.error))?;
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
