//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema**
//!
//! The scaler and scorer artifacts were fitted against this exact order.
//! Add, remove or reorder a feature → increment FEATURE_VERSION and refit.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "byte_count",  // 0: Bytes transferred in the flow
    "duration",    // 1: Flow duration in seconds
    "source_port", // 2: Originating port
    "dest_port",   // 3: Destination port
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 4;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// True when `names` is exactly the current layout, in order
pub fn matches_layout<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_LAYOUT)
            .all(|(given, expected)| given.as_ref() == *expected)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> &'static str {
    FEATURE_LAYOUT.get(index).copied().unwrap_or("<unknown>")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_matches_layout() {
        assert!(matches_layout(FEATURE_LAYOUT));
        assert!(!matches_layout(&["duration", "byte_count", "source_port", "dest_port"]));
        assert!(!matches_layout(&["byte_count", "duration", "source_port"]));
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), "byte_count");
        assert_eq!(feature_name(3), "dest_port");
        assert_eq!(feature_name(100), "<unknown>");
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.hash, layout_hash());
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
