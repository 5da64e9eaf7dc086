//! Artifact Manifest - integrity checks before load
//!
//! Optional `manifest.json` next to the artifacts:
//!
//! ```json
//! { "layout_hash": 1234567890, "artifacts": { "scaler.json": "<sha256 hex>" } }
//! ```
//!
//! Any listed file whose digest differs, or a layout hash that differs from
//! the compiled feature layout, is a load error.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::error::ModelLoadError;
use crate::logic::features::layout_hash;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Layout hash the artifacts were fitted against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
    /// File name (relative to the manifest) -> lowercase hex SHA-256
    #[serde(default)]
    pub artifacts: BTreeMap<String, String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ArtifactManifest {
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut manifest: ArtifactManifest =
            serde_json::from_str(&raw).map_err(|e| ModelLoadError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Check the layout hash, if the manifest pins one
    pub fn verify_layout(&self) -> Result<(), ModelLoadError> {
        match self.layout_hash {
            Some(hash) if hash != layout_hash() => Err(ModelLoadError::LayoutMismatch {
                artifact: "manifest".to_string(),
                expected: format!("{:08x}", layout_hash()),
                actual: format!("{hash:08x}"),
            }),
            _ => Ok(()),
        }
    }

    /// Verify `artifact` if the manifest lists it (matched by file name)
    pub fn verify(&self, artifact: &Path) -> Result<(), ModelLoadError> {
        let Some(name) = artifact.file_name().and_then(|n| n.to_str()) else {
            return Ok(());
        };
        let Some(expected) = self.artifacts.get(name) else {
            log::debug!("{name} not listed in manifest, skipping checksum");
            return Ok(());
        };

        let actual = sha256_file(artifact)?;
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ModelLoadError::ChecksumMismatch {
                path: artifact.to_path_buf(),
                expected: expected.clone(),
                actual,
            });
        }

        log::debug!("Checksum ok for {name}");
        Ok(())
    }

    /// Verify every listed artifact, relative to the manifest's directory
    pub fn verify_all(&self) -> Result<(), ModelLoadError> {
        self.verify_layout()?;
        for name in self.artifacts.keys() {
            self.verify(&self.base_dir.join(name))?;
        }
        Ok(())
    }
}

/// Streaming SHA-256 of a file, lowercase hex
pub fn sha256_file(path: &Path) -> Result<String, ModelLoadError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ModelLoadError::NotFound(path.to_path_buf()),
        _ => ModelLoadError::Unreadable { path: path.to_path_buf(), reason: e.to_string() },
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| ModelLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
