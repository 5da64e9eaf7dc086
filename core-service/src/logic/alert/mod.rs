//! Alert Module - materialization and the views built on it
//!
//! `materializer` turns scored observations into alerts; the rest are pure
//! reductions and writers over an alert batch.

pub mod types;
pub mod materializer;
pub mod summary;
pub mod describe;
pub mod metrics;
pub mod export;

// Re-export common types
pub use types::{Alert, Severity};
pub use materializer::{materialize, materialize_batch, materialize_from_field};
pub use summary::{count_by_date, count_by_severity, summarize, top_talkers, AlertSummary, TopTalkers};
pub use describe::{describe, ColumnStats};
pub use metrics::{evaluate, ModelMetrics};
pub use export::{export_alerts, write_alerts, ExportFormat};
