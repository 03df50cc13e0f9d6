//! Tool abstraction exposed to the protocol layer
//!
//! A tool describes itself through `ToolMetadata` and turns raw JSON arguments
//! into a `ToolOutcome`. The registry is what the server lists and dispatches
//! against, so the transport never needs to know which tools exist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::outcome::ToolOutcome;

pub mod python_executor;

pub use python_executor::PythonExecutorTool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// Core Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> ToolMetadata;
    async fn call(&self, arguments: Value) -> ToolOutcome;
}

// Tool registry for managing multiple tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name.clone();
        self.tools.insert(name, tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Metadata of every registered tool, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        let mut tools: Vec<ToolMetadata> = self.tools.values().map(|tool| tool.metadata()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata {
                name: "echo".to_string(),
                description: "Echoes its arguments".to_string(),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn call(&self, arguments: Value) -> ToolOutcome {
            ToolOutcome::Text(arguments.to_string())
        }
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let mut registry = ToolRegistry::new();
        assert_eq!(registry.tool_count(), 0);

        registry.register_tool(Arc::new(EchoTool));
        assert_eq!(registry.tool_count(), 1);
        assert!(registry.get_tool("missing").is_none());

        let tool = registry.get_tool("echo").unwrap();
        match tool.call(json!({"a": 1})).await {
            ToolOutcome::Text(text) => assert_eq!(text, r#"{"a":1}"#),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_registering_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Arc::new(EchoTool));
        registry.register_tool(Arc::new(EchoTool));
        assert_eq!(registry.tool_count(), 1);
        assert_eq!(registry.list_tools()[0].name, "echo");
    }
}
