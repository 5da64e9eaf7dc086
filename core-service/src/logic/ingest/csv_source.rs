//! CSV Source - tabular ingestion with whole-batch schema validation
//!
//! A single bad row fails the whole batch. Rows are never skipped or
//! coerced: dropping security-relevant records silently is not acceptable.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::observation::Observation;
use crate::logic::error::{PipelineError, PipelineResult, SchemaError};

// ============================================================================
// SCHEMA
// ============================================================================

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: &[&str] = &[
    "timestamp",
    "byte_count",
    "duration",
    "source_port",
    "dest_port",
];

/// Columns read when present
pub const OPTIONAL_COLUMNS: &[&str] = &[
    "source",
    "destination",
    "severity",
    "alert_type",
    "category",
    "label",
];

/// Naive timestamp layouts accepted besides RFC 3339 (interpreted as UTC)
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Column name -> position, built once from the header row
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, SchemaError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_ascii_lowercase(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !positions.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
    }

    fn required<'r>(
        &self,
        record: &'r csv::StringRecord,
        column: &str,
        row: usize,
    ) -> Result<&'r str, SchemaError> {
        match self.get(record, column) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(SchemaError::InvalidValue {
                row,
                column: column.to_string(),
                reason: "value is empty".to_string(),
            }),
        }
    }

    fn optional(&self, record: &csv::StringRecord, column: &str) -> Option<String> {
        self.get(record, column)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

// ============================================================================
// READING
// ============================================================================

/// Read a whole observation batch from a CSV file
pub fn read_observations(path: &Path) -> PipelineResult<Vec<Observation>> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let observations = read_observations_from_reader(file)?;
    log::info!("Read {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Read a whole observation batch from any CSV reader
pub fn read_observations_from_reader<R: Read>(reader: R) -> PipelineResult<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| SchemaError::MalformedRow { row: 0, reason: e.to_string() })?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut observations = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| SchemaError::MalformedRow { row, reason: e.to_string() })?;
        observations.push(parse_record(&columns, &record, row)?);
    }

    Ok(observations)
}

fn parse_record(
    columns: &ColumnIndex,
    record: &csv::StringRecord,
    row: usize,
) -> Result<Observation, SchemaError> {
    let raw_ts = columns.required(record, "timestamp", row)?;
    let timestamp = parse_timestamp(raw_ts).ok_or_else(|| SchemaError::InvalidValue {
        row,
        column: "timestamp".to_string(),
        reason: format!("unrecognised timestamp {raw_ts:?}"),
    })?;

    let byte_count = parse_count(columns.required(record, "byte_count", row)?, "byte_count", row)?;
    let duration = parse_count(columns.required(record, "duration", row)?, "duration", row)?;
    let source_port = parse_port(columns.required(record, "source_port", row)?, "source_port", row)?;
    let dest_port = parse_port(columns.required(record, "dest_port", row)?, "dest_port", row)?;

    Ok(Observation {
        timestamp,
        byte_count,
        duration,
        source_port,
        dest_port,
        source: columns.optional(record, "source"),
        destination: columns.optional(record, "destination"),
        reported_severity: columns.optional(record, "severity"),
        alert_type: columns.optional(record, "alert_type"),
        category: columns.optional(record, "category"),
        label: columns.optional(record, "label"),
    })
}

fn parse_count(raw: &str, column: &str, row: usize) -> Result<u64, SchemaError> {
    raw.parse::<u64>().map_err(|_| SchemaError::InvalidValue {
        row,
        column: column.to_string(),
        reason: format!("expected a non-negative integer, got {raw:?}"),
    })
}

fn parse_port(raw: &str, column: &str, row: usize) -> Result<u16, SchemaError> {
    raw.parse::<u16>().map_err(|_| SchemaError::InvalidValue {
        row,
        column: column.to_string(),
        reason: format!("expected a port in [0, 65535], got {raw:?}"),
    })
}

/// Parse RFC 3339, common naive datetime layouts (as UTC) or a bare date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const HEADER: &str = "timestamp,byte_count,duration,source_port,dest_port,source,destination\n";

    fn read(csv: &str) -> PipelineResult<Vec<Observation>> {
        read_observations_from_reader(csv.as_bytes())
    }

    #[test]
    fn test_reads_required_and_optional_columns() {
        let csv = format!("{HEADER}2023-01-01 10:00:00,1500,12,51000,443,10.0.0.1,192.168.1.3\n");
        let rows = read(&csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].byte_count, 1500);
        assert_eq!(rows[0].duration, 12);
        assert_eq!(rows[0].source_port, 51000);
        assert_eq!(rows[0].dest_port, 443);
        assert_eq!(rows[0].source.as_deref(), Some("10.0.0.1"));
        assert_eq!(rows[0].destination.as_deref(), Some("192.168.1.3"));
        assert_eq!(rows[0].timestamp.hour(), 10);
    }

    #[test]
    fn test_missing_dest_port_column_is_schema_error() {
        let csv = "timestamp,byte_count,duration,source_port\n2023-01-01,1,1,80\n";
        match read(csv) {
            Err(PipelineError::Schema(SchemaError::MissingColumns(cols))) => {
                assert_eq!(cols, vec!["dest_port".to_string()]);
            }
            other => panic!("Expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty_batch() {
        let rows = read(HEADER).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let csv = "Timestamp, Byte_Count ,DURATION,source_port,dest_port\n2023-01-01,5,1,1,2\n";
        let rows = read(csv).unwrap();
        assert_eq!(rows[0].byte_count, 5);
    }

    #[test]
    fn test_negative_byte_count_fails_batch() {
        let csv = format!("{HEADER}2023-01-01,10,1,1,2,,\n2023-01-01,-5,1,1,2,,\n");
        match read(&csv) {
            Err(PipelineError::Schema(SchemaError::InvalidValue { row, column, .. })) => {
                assert_eq!(row, 2);
                assert_eq!(column, "byte_count");
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_port_out_of_range_fails_batch() {
        let csv = format!("{HEADER}2023-01-01,10,1,70000,2,,\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::Schema(SchemaError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_empty_required_value_fails_batch() {
        let csv = format!("{HEADER}2023-01-01,10,1,80,,,\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::Schema(SchemaError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let csv = format!("{HEADER}2023-01-01,10,1\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::Schema(SchemaError::MalformedRow { row: 1, .. }))
        ));
    }

    #[test]
    fn test_empty_optional_becomes_none() {
        let csv = format!("{HEADER}2023-01-01,10,1,80,443,,\n");
        let rows = read(&csv).unwrap();
        assert!(rows[0].source.is_none());
        assert!(rows[0].destination.is_none());
    }

    #[test]
    fn test_severity_column_is_carried_as_reported() {
        let csv = "timestamp,byte_count,duration,source_port,dest_port,severity,alert_type\n\
                   2023-01-01,10,1,80,443,Medium,Port Scan\n";
        let rows = read(csv).unwrap();
        assert_eq!(rows[0].reported_severity.as_deref(), Some("Medium"));
        assert_eq!(rows[0].alert_type.as_deref(), Some("Port Scan"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2023-01-01T05:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 3);

        let naive = parse_timestamp("2023-01-01 05:30:00").unwrap();
        assert_eq!(naive.hour(), 5);

        let fractional = parse_timestamp("2023-01-01T05:30:00.250").unwrap();
        assert_eq!(fractional.minute(), 30);

        let date = parse_timestamp("2023-03-04").unwrap();
        assert_eq!(date.day(), 4);
        assert_eq!(date.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_observations(&dir.path().join("alerts.csv"));
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }
}
