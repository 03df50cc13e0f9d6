//! Configuration type definitions for the executor
//!
//! Every field carries a default so an empty YAML document (or no file at all)
//! yields a working configuration. The image reference is process-wide and is
//! never taken from a tool call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ExecutorError;

pub const DEFAULT_IMAGE: &str = "mcr.microsoft.com/playwright:v1.52.0-noble";

/// Which mechanism launches containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerBackend {
    /// Shell out to the container runtime's command line.
    #[default]
    Cli,
    /// Talk to the Docker Engine API directly.
    Daemon,
}

impl std::str::FromStr for ContainerBackend {
    type Err = ExecutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cli" => Ok(ContainerBackend::Cli),
            "daemon" => Ok(ContainerBackend::Daemon),
            other => Err(ExecutorError::Config(format!(
                "Unknown container backend '{}', expected 'cli' or 'daemon'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutorConfig {
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub backend: ContainerBackend,
    #[serde(default = "default_runtime_binary")]
    pub runtime_binary: String,
    #[serde(default = "default_network_mode")]
    pub network_mode: String,
    #[serde(default = "default_container_workdir")]
    pub container_workdir: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Parent directory for workspaces; the system temp dir when unset.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            backend: ContainerBackend::default(),
            runtime_binary: default_runtime_binary(),
            network_mode: default_network_mode(),
            container_workdir: default_container_workdir(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            workspace_root: None,
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Path of the bootstrap script as seen from inside the container.
    pub fn bootstrap_path_in_container(&self) -> String {
        format!(
            "{}/{}",
            self.container_workdir.trim_end_matches('/'),
            crate::executors::workspace::BOOTSTRAP_FILENAME
        )
    }

    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.image.trim().is_empty() {
            return Err(ExecutorError::Config("image cannot be empty".to_string()));
        }
        if self.runtime_binary.trim().is_empty() {
            return Err(ExecutorError::Config(
                "runtime_binary cannot be empty".to_string(),
            ));
        }
        if self.network_mode.trim().is_empty() {
            return Err(ExecutorError::Config(
                "network_mode cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ExecutorError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ExecutorError::Config(
                "max_concurrent must be greater than 0".to_string(),
            ));
        }
        if !Path::new(&self.container_workdir).is_absolute() {
            return Err(ExecutorError::Config(format!(
                "container_workdir must be an absolute path, got '{}'",
                self.container_workdir
            )));
        }
        if self.container_workdir.trim_end_matches('/').is_empty() {
            return Err(ExecutorError::Config(
                "container_workdir cannot be the container root".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_runtime_binary() -> String {
    "docker".to_string()
}

fn default_network_mode() -> String {
    "host".to_string()
}

fn default_container_workdir() -> String {
    "/app".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_concurrent() -> usize {
    4
}
