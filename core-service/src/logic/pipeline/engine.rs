//! Pipeline Engine
//!
//! observations → extract → scale → score → materialize → alerts
//!
//! Every stage is pure and row-independent, so rows are spread over the
//! rayon pool when `parallel` is on. Indexed collection keeps the i-th
//! alert aligned with the i-th observation either way.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::logic::alert::{materialize_batch, materialize_from_field, Alert};
use crate::logic::config::{PipelineConfig, SeveritySource};
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::{extract, extract_matrix, ScaledVector};
use crate::logic::ingest::Observation;
use crate::logic::model::{load_manifest, load_scaler, load_scorer, Scaler, ScoreLabel, Scorer};

/// Rows handed to one `score_batch` call on the parallel path
const SCORE_CHUNK: usize = 1024;

/// Loaded, read-only model capabilities
#[derive(Clone)]
struct ModelStage {
    scaler: Arc<Scaler>,
    scorer: Arc<dyn Scorer>,
}

/// The scoring pipeline with its capabilities passed in explicitly
#[derive(Clone)]
pub struct Pipeline {
    severity_source: SeveritySource,
    model: Option<ModelStage>,
    parallel: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("severity_source", &self.severity_source)
            .field("scorer", &self.scorer_name())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Pipeline {
    /// Model mode with already-loaded capabilities
    pub fn with_model(scaler: Arc<Scaler>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            severity_source: SeveritySource::Model,
            model: Some(ModelStage { scaler, scorer }),
            parallel: true,
        }
    }

    /// Field mode: severity from the input column, no model involved
    pub fn field_mode() -> Self {
        Self {
            severity_source: SeveritySource::Field,
            model: None,
            parallel: true,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load whatever the configured severity source needs
    ///
    /// Model artifacts are only touched in model mode.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let pipeline = match config.severity_source {
            SeveritySource::Field => {
                log::info!("Severity source: field (model artifacts not loaded)");
                Self::field_mode()
            }
            SeveritySource::Model => {
                let manifest = load_manifest(config)?;
                let scaler = load_scaler(&config.scaler_path, manifest.as_ref())?;
                let scorer = load_scorer(&config.scorer, manifest.as_ref())?;
                Self::with_model(Arc::new(scaler), scorer)
            }
        };
        Ok(pipeline.parallel(config.parallel))
    }

    pub fn severity_source(&self) -> SeveritySource {
        self.severity_source
    }

    pub fn scorer_name(&self) -> &str {
        match &self.model {
            Some(stage) => stage.scorer.name(),
            None => "field",
        }
    }

    /// Run a whole batch; any error means no alerts at all
    pub fn run(&self, observations: &[Observation]) -> PipelineResult<Vec<Alert>> {
        let started = Instant::now();

        let alerts = match &self.model {
            Some(stage) => self.run_model(stage, observations)?,
            None => Self::run_field(observations)?,
        };

        log::info!(
            "Materialized {} alerts (source={}, scorer={}) in {:?}",
            alerts.len(),
            self.severity_source.as_str(),
            self.scorer_name(),
            started.elapsed()
        );
        Ok(alerts)
    }

    /// Labels only, aligned with `observations`
    pub fn score(&self, observations: &[Observation]) -> PipelineResult<Vec<ScoreLabel>> {
        match &self.model {
            Some(stage) => self.score_with(stage, observations),
            None => Err(PipelineError::Scoring(
                "pipeline is in field mode; no scorer loaded".to_string(),
            )),
        }
    }

    fn score_with(&self, stage: &ModelStage, observations: &[Observation]) -> PipelineResult<Vec<ScoreLabel>> {
        if observations.is_empty() {
            return Ok(Vec::new());
        }

        // Before the scorer sees a single row
        stage.scaler.check_degenerate()?;

        let labels = if self.parallel {
            let scaled: Vec<ScaledVector> = observations
                .par_iter()
                .map(|o| stage.scaler.transform(&extract(o)))
                .collect();
            let chunks: Vec<Vec<ScoreLabel>> = scaled
                .par_chunks(SCORE_CHUNK)
                .map(|chunk| stage.scorer.score_batch(chunk))
                .collect::<PipelineResult<_>>()?;
            chunks.into_iter().flatten().collect::<Vec<_>>()
        } else {
            let matrix = stage.scaler.transform_matrix(&extract_matrix(observations))?;
            let scaled: Vec<ScaledVector> = matrix.rows().into_iter().map(ScaledVector::from_row).collect();
            stage.scorer.score_batch(&scaled)?
        };

        if labels.len() != observations.len() {
            return Err(PipelineError::Scoring(format!(
                "scorer returned {} labels for {} observations",
                labels.len(),
                observations.len()
            )));
        }

        Ok(labels)
    }

    fn run_model(&self, stage: &ModelStage, observations: &[Observation]) -> PipelineResult<Vec<Alert>> {
        let labels = self.score_with(stage, observations)?;
        log::debug!(
            "{} of {} observations scored as anomalies",
            labels.iter().filter(|l| l.is_anomaly()).count(),
            labels.len()
        );
        materialize_batch(observations, &labels)
    }

    /// Sequential so the reported row is always the first bad one
    fn run_field(observations: &[Observation]) -> PipelineResult<Vec<Alert>> {
        observations
            .iter()
            .enumerate()
            .map(|(i, obs)| materialize_from_field(obs, i + 1).map_err(PipelineError::from))
            .collect()
    }
}
