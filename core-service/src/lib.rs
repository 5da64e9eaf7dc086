//! NIDS core - network flow scoring library
//!
//! Shared by the `nids-score` CLI and the dashboard server.

pub mod constants;
pub mod logic;

pub use logic::alert::{Alert, Severity};
pub use logic::ingest::Observation;
pub use logic::{Pipeline, PipelineConfig, PipelineError, PipelineResult, SeveritySource};
