//! Container invoker backed by the Docker Engine API
//!
//! Mirrors the CLI backend's `run --rm` semantics: the container is created,
//! started, waited on and removed explicitly once its logs have been read.
//! The deadline covers the image pull, creation, start and the wait.

use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions as BollardCreateContainerOptionsQuery,
    CreateImageOptions as BollardCreateImageOptionsQuery,
    KillContainerOptions as BollardKillContainerOptionsQuery,
    LogsOptions as BollardLogsOptionsQuery,
    RemoveContainerOptions as BollardRemoveContainerOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
    WaitContainerOptions as BollardWaitContainerOptionsQuery,
};
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::time::Duration;

use super::{ContainerInvoker, ContainerSpec, InvocationResult};
use crate::errors::ExecutorError;

/// Bound on killing the container and reading its logs after the deadline.
const CLEANUP_GRACE: Duration = Duration::from_secs(30);

/// Runs containers through the Docker Engine API instead of the CLI.
pub struct DockerContainerInvoker {
    docker: Docker,
}

enum WaitOutcome {
    Exited(i64),
    Failed(ExecutorError),
}

impl DockerContainerInvoker {
    pub fn new() -> Result<Self, ExecutorError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }

    /// Container body mirroring `run -v <dir>:<workdir> --net=<mode> <image> <cmd>`.
    pub fn container_body(spec: &ContainerSpec) -> ContainerCreateBody {
        ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.workdir.clone()),
            host_config: Some(HostConfig {
                binds: Some(vec![spec.bind()]),
                network_mode: Some(spec.network_mode.clone()),
                // Removed explicitly after the logs are read.
                auto_remove: Some(false),
                ..Default::default()
            }),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        }
    }

    async fn ensure_image(&self, image: &str) -> Result<(), ExecutorError> {
        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        log::info!("Pulling image {}", image);
        let options = Some(BollardCreateImageOptionsQuery {
            from_image: Some(image.to_string()),
            ..Default::default()
        });
        let mut pull = self.docker.create_image(options, None, None);
        while let Some(progress) = pull.next().await {
            let info = progress?;
            log::debug!("Pulling image {}: {:?}", image, info.status);
        }
        Ok(())
    }

    async fn start(&self, spec: &ContainerSpec) -> Result<(), ExecutorError> {
        self.ensure_image(&spec.image).await?;

        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(spec.name.clone()),
            ..Default::default()
        });
        self.docker
            .create_container(options, Self::container_body(spec))
            .await?;

        if let Err(e) = self
            .docker
            .start_container(&spec.name, None::<BollardStartContainerOptionsQuery>)
            .await
        {
            self.remove(&spec.name).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn wait(&self, name: &str) -> WaitOutcome {
        let mut exec_stream = self
            .docker
            .wait_container(name, None::<BollardWaitContainerOptionsQuery>);

        match exec_stream.next().await {
            Some(Ok(response)) => WaitOutcome::Exited(response.status_code),
            // bollard reports a non-zero exit as an error carrying the code.
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => {
                WaitOutcome::Exited(code)
            }
            Some(Err(e)) => WaitOutcome::Failed(e.into()),
            None => WaitOutcome::Failed(ExecutorError::OutputCapture(std::io::Error::other(
                "Container wait stream ended unexpectedly",
            ))),
        }
    }

    async fn collect_logs(&self, name: &str, output: &mut Vec<u8>) {
        let mut output_stream = self.docker.logs(
            name,
            Some(BollardLogsOptionsQuery {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );

        while let Some(log_result) = output_stream.next().await {
            match log_result {
                Ok(LogOutput::StdOut { message })
                | Ok(LogOutput::StdErr { message })
                | Ok(LogOutput::Console { message }) => output.extend_from_slice(&message),
                Ok(LogOutput::StdIn { .. }) => {}
                Err(e) => {
                    log::warn!("Failed to read logs of container {}: {}", name, e);
                    break;
                }
            }
        }
    }

    async fn kill(&self, name: &str) {
        let killed = tokio::time::timeout(
            CLEANUP_GRACE,
            self.docker
                .kill_container(name, None::<BollardKillContainerOptionsQuery>),
        )
        .await;
        match killed {
            Ok(Ok(())) => log::debug!("Killed container {}", name),
            Ok(Err(e)) => log::warn!("Failed to kill container {}: {}", name, e),
            Err(_) => log::warn!("Timed out killing container {}", name),
        }
    }

    async fn remove(&self, name: &str) {
        let options = Some(BollardRemoveContainerOptionsQuery {
            force: true,
            ..Default::default()
        });
        if let Err(e) = self.docker.remove_container(name, options).await {
            log::warn!("Failed to remove container {}: {}", name, e);
        }
    }
}

#[async_trait]
impl ContainerInvoker for DockerContainerInvoker {
    async fn run(&self, spec: &ContainerSpec) -> InvocationResult {
        log::info!(
            "Starting container {} from image {} via Docker engine",
            spec.name,
            spec.image
        );

        let deadline = tokio::time::timeout(spec.timeout, async {
            self.start(spec).await?;
            Ok::<_, ExecutorError>(self.wait(&spec.name).await)
        })
        .await;

        let mut output = Vec::new();
        let result = match deadline {
            Ok(Err(e)) => {
                log::error!("Failed to start container {}: {}", spec.name, e);
                return InvocationResult::launch_failed(e);
            }
            Ok(Ok(WaitOutcome::Exited(code))) => {
                self.collect_logs(&spec.name, &mut output).await;
                InvocationResult::exited(code, output)
            }
            Ok(Ok(WaitOutcome::Failed(e))) => {
                log::error!("Waiting on container {} failed: {}", spec.name, e);
                InvocationResult::launch_failed(e)
            }
            Err(_) => {
                log::warn!(
                    "Execution timed out for container {} after {:?}",
                    spec.name,
                    spec.timeout
                );
                self.kill(&spec.name).await;
                let collected =
                    tokio::time::timeout(CLEANUP_GRACE, self.collect_logs(&spec.name, &mut output))
                        .await;
                if collected.is_err() {
                    log::warn!("Timed out reading logs of container {}", spec.name);
                }
                InvocationResult::timed_out(spec.timeout, output)
            }
        };

        self.remove(&spec.name).await;
        result
    }
}
