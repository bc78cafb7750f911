//! Filesystem locations for datasets, artifacts and the symbol registry.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorageEnvConfig {
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    pub registry_path: PathBuf,
}

impl Default for StorageEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datasets"),
            model_dir: PathBuf::from("trained_models/linear_regression"),
            registry_path: PathBuf::from("symbols.toml"),
        }
    }
}

impl StorageEnvConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("STOCKEYE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            model_dir: lookup("STOCKEYE_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            registry_path: lookup("STOCKEYE_REGISTRY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
        }
    }
}
