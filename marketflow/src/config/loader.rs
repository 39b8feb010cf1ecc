//! Loading the configuration from a YAML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::Config;
use crate::errors::MarketflowError;

/// The top-level document layout: everything nests under a `config:` key.
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    config: Config,
}

/// Loads and validates the research configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_file_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader for the given path without touching the filesystem.
    #[must_use]
    pub fn new(config_file_path: impl Into<PathBuf>) -> Self {
        Self {
            config_file_path: config_file_path.into(),
        }
    }

    /// Creates a loader, verifying up front that the file exists.
    pub fn from_path(config_file_path: impl Into<PathBuf>) -> Result<Self, MarketflowError> {
        let path = config_file_path.into();
        if !path.is_file() {
            return Err(MarketflowError::ConfigNotFound { path });
        }
        info!(path = %path.display(), "found config file");
        Ok(Self {
            config_file_path: path,
        })
    }

    /// The path this loader reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config_file_path
    }

    /// Parses the configuration file.
    pub fn load_config(&self) -> Result<Config, MarketflowError> {
        let text = std::fs::read_to_string(&self.config_file_path)?;
        let document: ConfigDocument = serde_yaml::from_str(&text)?;
        info!(
            path = %self.config_file_path.display(),
            research = %document.config.research.name,
            instruments = document.config.instruments().count(),
            "loaded configuration"
        );
        Ok(document.config)
    }
}
