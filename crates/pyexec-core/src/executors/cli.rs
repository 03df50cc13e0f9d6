//! Container runs through the runtime's command line (`docker run ...`).

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use super::{ContainerInvoker, ContainerSpec, InvocationResult};
use crate::errors::ExecutorError;

const READ_CHUNK: usize = 8192;

pub struct CliContainerInvoker {
    binary: String,
}

impl CliContainerInvoker {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments passed to the runtime binary for `spec`.
    pub fn command_args(spec: &ContainerSpec) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            spec.name.clone(),
            "-v".to_string(),
            spec.bind(),
            format!("--net={}", spec.network_mode),
            spec.image.clone(),
        ];
        args.extend(spec.command.iter().cloned());
        args
    }

    async fn kill_container(&self, name: &str) {
        let status = Command::new(&self.binary)
            .args(["kill", name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => log::debug!("Killed container {}", name),
            Ok(status) => log::warn!("'{} kill {}' exited with {}", self.binary, name, status),
            Err(e) => log::warn!("Failed to kill container {}: {}", name, e),
        }
    }
}

#[async_trait]
impl ContainerInvoker for CliContainerInvoker {
    async fn run(&self, spec: &ContainerSpec) -> InvocationResult {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::command_args(spec))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!(
            "Starting container {} from image {} via {}",
            spec.name,
            spec.image,
            self.binary
        );

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                log::error!("Failed to launch '{}': {}", self.binary, source);
                return InvocationResult::launch_failed(ExecutorError::RuntimeLaunch {
                    binary: self.binary.clone(),
                    source,
                });
            }
        };

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                return InvocationResult::launch_failed(ExecutorError::OutputCapture(
                    std::io::Error::other("container runtime stdio was not captured"),
                ))
            }
        };

        let mut output = Vec::new();
        let waited =
            tokio::time::timeout(spec.timeout, drive(&mut child, stdout, stderr, &mut output))
                .await;

        match waited {
            Ok(Ok(status)) => InvocationResult::exited(exit_code(status), output),
            Ok(Err(e)) => {
                log::error!("Lost track of container {}: {}", spec.name, e);
                self.kill_container(&spec.name).await;
                InvocationResult::launch_failed(ExecutorError::OutputCapture(e))
            }
            Err(_) => {
                log::warn!(
                    "Execution timed out for container {} after {:?}",
                    spec.name,
                    spec.timeout
                );
                self.kill_container(&spec.name).await;
                if let Err(e) = child.kill().await {
                    log::debug!("Runtime process for {} already gone: {}", spec.name, e);
                }
                InvocationResult::timed_out(spec.timeout, output)
            }
        }
    }
}

/// Drain both pipes into `output` in arrival order, then reap the process.
async fn drive(
    child: &mut Child,
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
    output: &mut Vec<u8>,
) -> std::io::Result<ExitStatus> {
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let (mut out_open, mut err_open) = (true, true);

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read? {
                0 => out_open = false,
                n => output.extend_from_slice(&out_buf[..n]),
            },
            read = stderr.read(&mut err_buf), if err_open => match read? {
                0 => err_open = false,
                n => output.extend_from_slice(&err_buf[..n]),
            },
        }
    }

    child.wait().await
}

fn exit_code(status: ExitStatus) -> i64 {
    if let Some(code) = status.code() {
        return i64::from(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + i64::from(signal);
        }
    }
    -1
}
