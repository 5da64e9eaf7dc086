//! Model Module - scaling and anomaly scoring
//!
//! Scaler + scorer capabilities, loaded once and shared read-only.
//! The scorer is a trait so detection strategies can be swapped without
//! touching materialization.

pub mod scaler;
pub mod scorer;
pub mod forest;
pub mod inference;
pub mod manifest;
pub mod loader;

// Re-export common types
pub use scaler::{Scaler, ScalerParams};
pub use scorer::{ScoreLabel, Scorer};
pub use forest::{ForestModel, IsolationForestScorer};
pub use inference::OnnxScorer;
pub use manifest::ArtifactManifest;
pub use loader::{load_manifest, load_scaler, load_scorer};
