//! Logic Module - ingestion, scoring and aggregation
//!
//! - `ingest/` - CSV loading and explicit synthetic flows
//! - `features/` - fixed feature layout and extraction
//! - `model/` - scaler, scorer trait, forest/ONNX backends, artifact checks
//! - `alert/` - materialization, aggregations, export
//! - `pipeline/` - end-to-end batch run

pub mod config;
pub mod error;

pub mod ingest;
pub mod features;
pub mod model;
pub mod alert;
pub mod pipeline;

pub use config::{PipelineConfig, SeveritySource};
pub use error::{ModelLoadError, PipelineError, PipelineResult, SchemaError};
pub use pipeline::Pipeline;
