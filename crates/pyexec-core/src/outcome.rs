//! Caller-facing outcomes of a tool call.

use crate::errors::{ExecutorError, RequestError};
use crate::executors::{InvocationResult, InvocationStatus};

#[derive(Debug)]
pub enum ToolOutcome {
    /// Captured output of a successful run, verbatim.
    Text(String),
    /// A failure the caller can act on: bad input, failing script, timeout.
    ToolError(String),
    /// Host-side trouble unrelated to the submitted code.
    Fatal(ExecutorError),
}

impl ToolOutcome {
    pub fn is_text(&self) -> bool {
        matches!(self, ToolOutcome::Text(_))
    }

    pub fn is_tool_error(&self) -> bool {
        matches!(self, ToolOutcome::ToolError(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ToolOutcome::Fatal(_))
    }
}

impl From<RequestError> for ToolOutcome {
    fn from(err: RequestError) -> Self {
        ToolOutcome::ToolError(err.to_string())
    }
}

/// A file that could not be written into an existing workspace is reported to
/// the caller like a failed run; everything else on the host side is fatal.
impl From<ExecutorError> for ToolOutcome {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::WorkspaceWrite { .. } => ToolOutcome::ToolError(err.to_string()),
            err => ToolOutcome::Fatal(err),
        }
    }
}

/// Map a container run to the outcome returned to the caller.
pub fn classify(result: InvocationResult) -> ToolOutcome {
    let output = String::from_utf8_lossy(&result.output).into_owned();
    match result.status {
        InvocationStatus::Exited(0) => ToolOutcome::Text(output),
        InvocationStatus::Exited(code) => {
            log::info!("Script exited with code {}", code);
            ToolOutcome::ToolError(format!(
                "execution failed with exit code {}: {}",
                code, output
            ))
        }
        InvocationStatus::TimedOut(after) => ToolOutcome::ToolError(format!(
            "execution timed out after {}s: {}",
            after.as_secs(),
            output
        )),
        InvocationStatus::LaunchFailed(err) => ToolOutcome::Fatal(err),
    }
}
