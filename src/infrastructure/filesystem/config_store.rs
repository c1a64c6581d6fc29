use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::entities::WatchConfig;

/// Name of the per-repository settings file
pub const CONFIG_FILE_NAME: &str = ".autover.yml";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("Configuration file write failed: {0}")]
    WriteFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Configuration file already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Reads and writes `.autover.yml` in a repository root
#[derive(Debug, Clone, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Path of the settings file for `root`
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Load settings for the repository at `root`
    ///
    /// A missing file yields the defaults. The result is validated before it
    /// is returned.
    pub fn load(&self, root: &Path) -> Result<WatchConfig, ConfigStoreError> {
        let config_path = Self::config_path(root);

        let config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| ConfigStoreError::ReadFailed(format!("{}: {}", config_path.display(), e)))?;

            if contents.trim().is_empty() {
                WatchConfig::default()
            } else {
                serde_yaml::from_str::<WatchConfig>(&contents)
                    .map_err(|e| ConfigStoreError::YamlParsingFailed(format!("{}: {}", config_path.display(), e)))?
            }
        } else {
            debug!(path = %config_path.display(), "no configuration file, using defaults");
            WatchConfig::default()
        };

        let config = config.with_root(root);
        config.check().map_err(ConfigStoreError::ValidationFailed)?;
        Ok(config)
    }

    /// Write `config` to `<root>/.autover.yml`
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn save(&self, root: &Path, config: &WatchConfig, force: bool) -> Result<PathBuf, ConfigStoreError> {
        let config_path = Self::config_path(root);
        if config_path.exists() && !force {
            return Err(ConfigStoreError::AlreadyExists(config_path.display().to_string()));
        }

        config.check().map_err(ConfigStoreError::ValidationFailed)?;

        let yaml_content = serde_yaml::to_string(config)?;
        fs::write(&config_path, yaml_content)
            .map_err(|e| ConfigStoreError::WriteFailed(format!("{}: {}", config_path.display(), e)))?;

        Ok(config_path)
    }
}
