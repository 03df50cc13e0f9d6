//! Error types for the execution pipeline
//!
//! Failures are split by who caused them. `RequestError` is the caller-input
//! tier: its message goes straight back to the caller as a tool error and no
//! resources have been touched when it is raised. `ExecutorError` covers the
//! host side (workspace I/O, container runtime, configuration) and is what a
//! fatal outcome carries, except a failed file write into an existing
//! workspace, which the caller sees as a tool error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("missing or invalid 'code' argument")]
    MissingCode,
    #[error("invalid library name '{name}': only package names with an optional '==' version pin are accepted")]
    InvalidLibrary { name: String },
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to create temporary directory: {0}")]
    WorkspaceCreate(#[source] std::io::Error),
    #[error("Failed to write {what} to file: {source}")]
    WorkspaceWrite {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not use temporary directory path: {0}")]
    TempPath(String),
    #[error("Failed to launch container runtime '{binary}': {source}")]
    RuntimeLaunch {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error while collecting container output: {0}")]
    OutputCapture(#[source] std::io::Error),
    #[error("Docker engine error: {0}")]
    Bollard(#[from] bollard::errors::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Execution slot unavailable: {0}")]
    Admission(String),
}
