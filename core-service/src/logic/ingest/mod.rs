//! Ingest Module - raw observations in
//!
//! CSV reading with whole-batch schema validation, plus an explicit
//! synthetic generator for demos.

pub mod observation;
pub mod csv_source;
pub mod synthetic;

// Re-export common types
pub use observation::Observation;
pub use csv_source::{read_observations, read_observations_from_reader, REQUIRED_COLUMNS};
pub use synthetic::SyntheticConfig;
