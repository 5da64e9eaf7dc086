//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Flow CSV scored at startup and on reload
    pub input: Option<PathBuf>,

    /// Pipeline config JSON; defaults apply when unset
    pub pipeline_config: Option<PathBuf>,

    /// Explicit demo mode: score this many synthetic flows instead of a file
    pub synthetic_rows: Option<usize>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            input: env::var("NIDS_INPUT").ok().filter(|s| !s.is_empty()).map(PathBuf::from),

            pipeline_config: nids_core::constants::pipeline_config_from_env(),

            synthetic_rows: env::var("NIDS_SYNTHETIC_ROWS")
                .ok()
                .and_then(|r| r.parse().ok()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
