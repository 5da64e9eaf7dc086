//! Features Module - Feature Extraction Engine
//!
//! Turns an observation into the fixed-order numeric vector the scaler and
//! scorer were fitted with.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{extract, extract_matrix, FeatureVector, ScaledVector};
