//! Configuration module for the executor
//!
//! Configuration comes from an optional YAML file; the server binary layers
//! command-line overrides on top before validating.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests;
