//! Persistence for trained model bundles.
//!
//! One JSON file per symbol holds the model and both normalizers, so they
//! are always written and read as a unit. Writes go through a temp file and
//! a rename, which keeps readers from ever observing a half-written bundle.

use crate::config::SymbolEntry;
use crate::domain::errors::{ArtifactError, NotFoundError};
use crate::domain::ml::artifact::ModelArtifactBundle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path_for(&self, entry: &SymbolEntry) -> PathBuf {
        self.root.join(&entry.artifact)
    }

    /// Persists `bundle` for `entry`, assigning the next version number.
    /// Returns the bundle as stored.
    pub fn save(
        &self,
        entry: &SymbolEntry,
        mut bundle: ModelArtifactBundle,
    ) -> Result<ModelArtifactBundle, ArtifactError> {
        if bundle.symbol != entry.key {
            return Err(ArtifactError::SymbolMismatch {
                expected: entry.key.clone(),
                found: bundle.symbol,
            });
        }

        fs::create_dir_all(&self.root).map_err(|source| ArtifactError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.path_for(entry);
        bundle.version = self.stored_version(&path).map_or(1, |v| v + 1);

        let content = serde_json::to_string_pretty(&bundle)?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("tmp");
        if let Err(source) = fs::write(&temp_path, content) {
            fs::remove_file(&temp_path).ok();
            return Err(ArtifactError::Io {
                path: temp_path,
                source,
            });
        }
        if let Err(source) = fs::rename(&temp_path, &path) {
            fs::remove_file(&temp_path).ok();
            return Err(ArtifactError::Io { path, source });
        }

        info!(
            "Saved {} bundle v{} ({}) to {:?}",
            bundle.symbol, bundle.version, bundle.content_hash, path
        );
        Ok(bundle)
    }

    /// Loads and verifies the bundle for `entry`.
    pub fn load(&self, entry: &SymbolEntry) -> Result<ModelArtifactBundle, ArtifactError> {
        let path = self.path_for(entry);
        if !path.exists() {
            return Err(NotFoundError::Artifact {
                symbol: entry.key.clone(),
                path,
            }
            .into());
        }

        let content = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        let bundle: ModelArtifactBundle =
            serde_json::from_str(&content).map_err(|e| ArtifactError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if bundle.symbol != entry.key {
            return Err(ArtifactError::SymbolMismatch {
                expected: entry.key.clone(),
                found: bundle.symbol,
            });
        }
        bundle
            .validate()
            .map_err(|reason| ArtifactError::Corrupt { path, reason })?;

        Ok(bundle)
    }

    /// Version of the bundle currently on disk, if it is readable.
    pub fn current_version(&self, entry: &SymbolEntry) -> Option<u64> {
        self.stored_version(&self.path_for(entry))
    }

    fn stored_version(&self, path: &Path) -> Option<u64> {
        if !path.exists() {
            return None;
        }
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<ModelArtifactBundle>(&content) {
            Ok(existing) => Some(existing.version),
            Err(e) => {
                warn!(
                    "Existing bundle {:?} is unreadable ({}), restarting versions",
                    path, e
                );
                None
            }
        }
    }
}
