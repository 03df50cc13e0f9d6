//! Sandboxed execution of untrusted Python in disposable containers.
//!
//! Each call gets its own temporary workspace holding the submitted script and
//! a generated bootstrap script. A container (Playwright image by default)
//! mounts the workspace, builds a fresh virtual environment, installs any
//! requested libraries and runs the script. The merged output and exit status
//! are then classified into one of three outcomes:
//!
//! - **Text**: the script exited zero; its output verbatim
//! - **ToolError**: bad arguments, a script that could not be written, a
//!   failing script or a timeout
//! - **Fatal**: the host could not provide a workspace or a container
//!
//! Concurrency is bounded by a semaphore and every run carries a deadline.

pub mod config;
pub mod errors;
pub mod executors;
pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod tools;

pub use config::{ConfigLoader, ContainerBackend, ExecutorConfig};
pub use errors::{ExecutorError, RequestError};
pub use executors::ContainerInvoker;
pub use orchestrator::PythonExecutor;
pub use outcome::ToolOutcome;
pub use request::ExecutionRequest;
pub use tools::{PythonExecutorTool, Tool, ToolMetadata, ToolRegistry};
