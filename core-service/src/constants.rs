//! Central Configuration Constants
//!
//! Single source of truth for pipeline defaults.
//! To change a default artifact location, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "NIDS Dashboard";

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "nids";

/// Pipeline config file name inside [`CONFIG_DIR_NAME`]
pub const PIPELINE_CONFIG_FILE: &str = "pipeline.json";

/// Default scaler artifact path
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";

/// Default scorer artifact path
pub const DEFAULT_SCORER_PATH: &str = "models/isolation_forest.json";

/// Default number of rows produced by the synthetic demo generator
pub const DEFAULT_SYNTHETIC_ROWS: usize = 100;

/// Default N for top-talker aggregations
pub const DEFAULT_TOP_N: usize = 5;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the pipeline config path from environment, if set
pub fn pipeline_config_from_env() -> Option<std::path::PathBuf> {
    std::env::var("NIDS_PIPELINE_CONFIG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(std::path::PathBuf::from)
}

/// Default pipeline config location (`<config dir>/nids/pipeline.json`)
pub fn default_pipeline_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(PIPELINE_CONFIG_FILE))
}
