//! Artifact Loader - startup capabilities
//!
//! `load_scaler()` / `load_scorer()` run once at process start. The loaded
//! values are immutable and handed to the pipeline explicitly.

use std::path::Path;
use std::sync::Arc;

use super::forest::IsolationForestScorer;
use super::inference::OnnxScorer;
use super::manifest::ArtifactManifest;
use super::scaler::Scaler;
use super::scorer::Scorer;
use crate::logic::config::{PipelineConfig, ScorerConfig, ScorerKind};
use crate::logic::error::ModelLoadError;
use crate::logic::features::FEATURE_COUNT;

/// Load the manifest named in the config, if any, and verify its layout pin
/// and every artifact it lists
pub fn load_manifest(config: &PipelineConfig) -> Result<Option<ArtifactManifest>, ModelLoadError> {
    match &config.manifest_path {
        Some(path) => {
            let manifest = ArtifactManifest::load(path)?;
            manifest.verify_all()?;
            log::info!("Manifest verified: {} artifact(s)", manifest.artifacts.len());
            Ok(Some(manifest))
        }
        None => Ok(None),
    }
}

fn verify(manifest: Option<&ArtifactManifest>, path: &Path) -> Result<(), ModelLoadError> {
    match manifest {
        Some(m) => m.verify(path),
        None => Ok(()),
    }
}

pub fn load_scaler(path: &Path, manifest: Option<&ArtifactManifest>) -> Result<Scaler, ModelLoadError> {
    verify(manifest, path)?;
    Scaler::load(path)
}

pub fn load_scorer(
    config: &ScorerConfig,
    manifest: Option<&ArtifactManifest>,
) -> Result<Arc<dyn Scorer>, ModelLoadError> {
    verify(manifest, &config.path)?;

    let scorer: Arc<dyn Scorer> = match config.kind {
        ScorerKind::IsolationForest => Arc::new(IsolationForestScorer::load(&config.path)?),
        ScorerKind::Onnx => Arc::new(OnnxScorer::load(&config.path)?),
    };

    if scorer.arity() != FEATURE_COUNT {
        return Err(ModelLoadError::ArityMismatch {
            artifact: config.path.display().to_string(),
            expected: FEATURE_COUNT,
            actual: scorer.arity(),
        });
    }

    log::info!("Scorer ready: {} ({})", scorer.name(), config.path.display());
    Ok(scorer)
}
