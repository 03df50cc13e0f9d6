//! Extraction of an execution request from untyped tool arguments
//!
//! `code` is strict: absent or non-string fails the call. `libraries` is
//! lenient about shape (a non-array counts as empty, non-string entries are
//! dropped) but strict about content: every string that survives must be a
//! package name with an optional `==` pin, because it is pasted verbatim into
//! a shell script.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::RequestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub code: String,
    pub libraries: Vec<String>,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            libraries: Vec::new(),
        }
    }

    pub fn with_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libraries = libraries.into_iter().map(Into::into).collect();
        self
    }

    /// Build a request from a tool call's argument object.
    pub fn from_arguments(arguments: &Value) -> Result<Self, RequestError> {
        let code = arguments
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or(RequestError::MissingCode)?;

        let libraries: Vec<String> = match arguments.get("libraries") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        let request = Self::new(code).with_libraries(libraries);
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        match self.libraries.iter().find(|lib| !is_valid_library(lib)) {
            Some(bad) => Err(RequestError::InvalidLibrary { name: bad.clone() }),
            None => Ok(()),
        }
    }
}

fn library_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // name or name==version, nothing the shell would interpret
        Regex::new(concat!(
            r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?",
            r"(?:==[A-Za-z0-9](?:[A-Za-z0-9._+-]*[A-Za-z0-9])?)?$",
        ))
        .expect("library name pattern is a valid regex")
    })
}

pub fn is_valid_library(name: &str) -> bool {
    library_pattern().is_match(name)
}
