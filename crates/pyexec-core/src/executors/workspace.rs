//! Per-invocation scratch directory
//!
//! A `Workspace` owns a uniquely named temporary directory holding the user
//! script and the bootstrap script. The directory is removed when the value is
//! dropped, so every exit path (errors, timeouts, panics unwinding through the
//! caller) reclaims it. `release` does the same removal but reports failures.

use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tokio::fs;

use crate::errors::ExecutorError;

pub const SCRIPT_FILENAME: &str = "script.py";
pub const BOOTSTRAP_FILENAME: &str = "run.sh";
const WORKSPACE_PREFIX: &str = "python-executor-";

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    script_path: PathBuf,
    bootstrap_path: PathBuf,
}

impl Workspace {
    /// Create a fresh directory under `root`, or the system temp dir.
    pub fn acquire(root: Option<&Path>) -> Result<Self, ExecutorError> {
        let mut builder = Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(ExecutorError::WorkspaceCreate)?;

        let script_path = dir.path().join(SCRIPT_FILENAME);
        let bootstrap_path = dir.path().join(BOOTSTRAP_FILENAME);
        log::debug!("Acquired workspace {}", dir.path().display());

        Ok(Self {
            dir,
            script_path,
            bootstrap_path,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn bootstrap_path(&self) -> &Path {
        &self.bootstrap_path
    }

    /// Host path as a string, for bind mount specifications.
    pub fn root_str(&self) -> Result<&str, ExecutorError> {
        self.dir
            .path()
            .to_str()
            .ok_or_else(|| ExecutorError::TempPath("Invalid temp path".to_string()))
    }

    pub async fn write_script(&self, code: &str) -> Result<(), ExecutorError> {
        write_with_mode(&self.script_path, code.as_bytes(), 0o644)
            .await
            .map_err(|source| ExecutorError::WorkspaceWrite {
                what: "script",
                source,
            })
    }

    pub async fn write_bootstrap(&self, script: &str) -> Result<(), ExecutorError> {
        write_with_mode(&self.bootstrap_path, script.as_bytes(), 0o755)
            .await
            .map_err(|source| ExecutorError::WorkspaceWrite {
                what: "shell script",
                source,
            })
    }

    /// Remove the directory now. Failure is logged, never propagated.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => log::debug!("Released workspace {}", path.display()),
            Err(e) => log::warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}

async fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    fs::write(path, contents).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
