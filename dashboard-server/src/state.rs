//! Shared application state
//!
//! The live batch sits behind `RwLock<Arc<_>>`: readers clone the `Arc` and
//! release the lock immediately, reload swaps in a fully scored batch or
//! leaves the old one untouched. Reloads run one at a time so the batch
//! that ends up live is the last one scored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nids_core::logic::ingest::{self, synthetic, SyntheticConfig};
use nids_core::{Alert, Pipeline, PipelineConfig, PipelineResult, SeveritySource};
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// One fully scored batch and where it came from
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub alerts: Vec<Alert>,
    pub severity_source: SeveritySource,
    pub scorer: String,
    pub input: String,
    pub scored_at: DateTime<Utc>,
}

impl ScoredBatch {
    /// Load config and artifacts, read the configured input, score it
    pub fn load(config: &Config) -> AppResult<Self> {
        let pipeline_config = match &config.pipeline_config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        let pipeline = Pipeline::from_config(&pipeline_config)?;

        let (observations, input) = match (&config.input, config.synthetic_rows) {
            (Some(path), _) => (ingest::read_observations(path)?, path.display().to_string()),
            (None, Some(rows)) => {
                tracing::warn!("No input file configured; scoring {} synthetic demo flows", rows);
                let flows = synthetic::generate(&SyntheticConfig { rows, ..Default::default() });
                (flows, format!("synthetic:{rows}"))
            }
            (None, None) => {
                return Err(AppError::ConfigError(
                    "no input configured: set NIDS_INPUT (or NIDS_SYNTHETIC_ROWS for demo data)".to_string(),
                ))
            }
        };

        Self::score(&pipeline, &observations, input).map_err(AppError::from)
    }

    pub fn score(
        pipeline: &Pipeline,
        observations: &[nids_core::Observation],
        input: String,
    ) -> PipelineResult<Self> {
        let alerts = pipeline.run(observations)?;
        Ok(Self {
            alerts,
            severity_source: pipeline.severity_source(),
            scorer: pipeline.scorer_name().to_string(),
            input,
            scored_at: Utc::now(),
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    batch: Arc<RwLock<Arc<ScoredBatch>>>,
    pub(crate) reload_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, batch: ScoredBatch) -> Self {
        Self {
            config,
            batch: Arc::new(RwLock::new(Arc::new(batch))),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot of the live batch
    pub async fn batch(&self) -> Arc<ScoredBatch> {
        self.batch.read().await.clone()
    }

    /// Rescore off the async runtime; swap only on success
    ///
    /// Held across load and swap: a slower reload that started earlier can
    /// never overwrite a newer batch.
    pub async fn reload(&self) -> AppResult<Arc<ScoredBatch>> {
        let _guard = self.reload_lock.lock().await;

        let config = self.config.clone();
        let fresh = tokio::task::spawn_blocking(move || ScoredBatch::load(&config)).await??;

        let fresh = Arc::new(fresh);
        *self.batch.write().await = fresh.clone();
        tracing::info!("Reloaded {} alerts from {}", fresh.alerts.len(), fresh.input);
        Ok(fresh)
    }
}
