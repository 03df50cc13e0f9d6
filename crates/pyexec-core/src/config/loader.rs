//! Configuration loader for YAML files

use crate::config::types::ExecutorConfig;
use crate::errors::ExecutorError;
use std::path::Path;
use tokio::fs;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ExecutorConfig, ExecutorError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            ExecutorError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<ExecutorConfig, ExecutorError> {
        // An empty document deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(ExecutorConfig::default());
        }

        let config: ExecutorConfig = serde_yaml::from_str(content)
            .map_err(|e| ExecutorError::Config(format!("Failed to parse YAML config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, else from `fallback` when that file exists,
    /// else defaults.
    pub async fn resolve(
        path: Option<&Path>,
        fallback: Option<&Path>,
    ) -> Result<ExecutorConfig, ExecutorError> {
        if let Some(path) = path {
            log::info!("Loading configuration from file: {}", path.display());
            return Self::from_file(path).await;
        }

        match fallback {
            Some(fallback) if fallback.exists() => {
                log::info!("Loading configuration from file: {}", fallback.display());
                Self::from_file(fallback).await
            }
            _ => {
                log::debug!("No configuration file found, using defaults");
                Ok(ExecutorConfig::default())
            }
        }
    }
}
