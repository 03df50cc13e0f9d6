//! Container execution for untrusted scripts.
//!
//! A run goes through a per-call `Workspace`, a rendered bootstrap script and
//! a `ContainerInvoker` that launches the container and blocks until it exits
//! or its deadline passes. Two invokers exist: one drives the container
//! runtime's command line, the other the Docker Engine API.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{ContainerBackend, ExecutorConfig};
use crate::errors::ExecutorError;

pub mod bootstrap;
pub mod cli;
pub mod docker;
pub mod workspace;

pub use cli::CliContainerInvoker;
pub use docker::DockerContainerInvoker;
pub use workspace::Workspace;

/// Everything an invoker needs to start one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub host_dir: String,
    pub workdir: String,
    pub network_mode: String,
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl ContainerSpec {
    pub fn for_workspace(
        workspace: &Workspace,
        config: &ExecutorConfig,
    ) -> Result<Self, ExecutorError> {
        Ok(Self {
            name: format!("pyexec-{}", Uuid::new_v4()),
            image: config.image.clone(),
            host_dir: workspace.root_str()?.to_string(),
            workdir: config.container_workdir.trim_end_matches('/').to_string(),
            network_mode: config.network_mode.clone(),
            command: vec!["bash".to_string(), config.bootstrap_path_in_container()],
            timeout: config.timeout(),
        })
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.host_dir, self.workdir)
    }
}

#[derive(Debug)]
pub enum InvocationStatus {
    /// The container ran to completion with this exit code.
    Exited(i64),
    /// The deadline passed and the container was killed.
    TimedOut(Duration),
    /// The container never ran, or the runtime failed underneath it.
    LaunchFailed(ExecutorError),
}

/// Raw result of one container run: stdout and stderr merged in arrival order.
#[derive(Debug)]
pub struct InvocationResult {
    pub output: Vec<u8>,
    pub status: InvocationStatus,
}

impl InvocationResult {
    pub fn exited(code: i64, output: Vec<u8>) -> Self {
        Self {
            output,
            status: InvocationStatus::Exited(code),
        }
    }

    pub fn timed_out(after: Duration, output: Vec<u8>) -> Self {
        Self {
            output,
            status: InvocationStatus::TimedOut(after),
        }
    }

    pub fn launch_failed(error: ExecutorError) -> Self {
        Self {
            output: Vec::new(),
            status: InvocationStatus::LaunchFailed(error),
        }
    }
}

#[async_trait]
pub trait ContainerInvoker: Send + Sync {
    async fn run(&self, spec: &ContainerSpec) -> InvocationResult;
}

/// Build the invoker selected by the configuration.
pub fn invoker_for(
    config: &ExecutorConfig,
) -> Result<std::sync::Arc<dyn ContainerInvoker>, ExecutorError> {
    match config.backend {
        ContainerBackend::Cli => Ok(std::sync::Arc::new(CliContainerInvoker::new(
            config.runtime_binary.clone(),
        ))),
        ContainerBackend::Daemon => Ok(std::sync::Arc::new(DockerContainerInvoker::new()?)),
    }
}
