//! End-to-end handling of one execution request.
//!
//! Requests queue on a semaphore sized by `max_concurrent`, then each gets its
//! own workspace and container. Nothing else is shared between calls.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::ExecutorConfig;
use crate::errors::ExecutorError;
use crate::executors::{bootstrap, invoker_for, ContainerInvoker, ContainerSpec, Workspace};
use crate::outcome::{classify, ToolOutcome};
use crate::request::ExecutionRequest;

pub struct PythonExecutor {
    config: ExecutorConfig,
    invoker: Arc<dyn ContainerInvoker>,
    permits: Arc<Semaphore>,
}

impl PythonExecutor {
    /// Validate `config` and build the invoker for its backend.
    pub fn new(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate()?;
        let invoker = invoker_for(&config)?;
        Ok(Self::with_invoker(config, invoker))
    }

    pub fn with_invoker(config: ExecutorConfig, invoker: Arc<dyn ContainerInvoker>) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            config,
            invoker,
            permits,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Extract a request from raw tool arguments and execute it. Malformed
    /// arguments are answered before any slot or workspace is taken.
    pub async fn execute_arguments(&self, arguments: &Value) -> ToolOutcome {
        match ExecutionRequest::from_arguments(arguments) {
            Ok(request) => self.execute(&request).await,
            Err(e) => {
                log::debug!("Rejected tool arguments: {}", e);
                e.into()
            }
        }
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> ToolOutcome {
        if let Err(e) = request.validate() {
            return e.into();
        }

        if self.permits.available_permits() == 0 {
            log::debug!(
                "All {} execution slots busy, waiting",
                self.config.max_concurrent
            );
        }
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return ExecutorError::Admission(e.to_string()).into(),
        };

        let workspace = match Workspace::acquire(self.config.workspace_root.as_deref()) {
            Ok(workspace) => workspace,
            Err(e) => {
                log::error!("{}", e);
                return e.into();
            }
        };

        let outcome = match self.run_in(&workspace, request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("{}", e);
                e.into()
            }
        };
        workspace.release();
        outcome
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        request: &ExecutionRequest,
    ) -> Result<ToolOutcome, ExecutorError> {
        workspace.write_script(&request.code).await?;
        let script = bootstrap::render(&request.libraries, &self.config.container_workdir);
        workspace.write_bootstrap(&script).await?;

        let spec = ContainerSpec::for_workspace(workspace, &self.config)?;
        let result = self.invoker.run(&spec).await;
        Ok(classify(result))
    }
}
