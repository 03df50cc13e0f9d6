//! MCP handler that exposes the tool registry over rmcp.

use pyexec_core::{ToolMetadata, ToolOutcome, ToolRegistry};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool as McpTool,
};
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;

pub const SERVER_NAME: &str = "python-executor";

#[derive(Clone)]
pub struct ExecutorServer {
    registry: Arc<ToolRegistry>,
}

impl ExecutorServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn mcp_tools(&self) -> Vec<McpTool> {
        self.registry.list_tools().into_iter().map(to_mcp_tool).collect()
    }

    /// Dispatch a call by name. Only unknown tools and fatal outcomes become
    /// protocol errors; everything else is a regular tool result.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.registry.get_tool(name).ok_or_else(|| {
            McpError::invalid_params(format!("Tool '{}' not found", name), None)
        })?;

        let arguments = Value::Object(arguments.unwrap_or_default());
        log::debug!("Calling tool '{}'", name);
        into_call_result(tool.call(arguments).await)
    }
}

pub fn into_call_result(outcome: ToolOutcome) -> Result<CallToolResult, McpError> {
    match outcome {
        ToolOutcome::Text(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        ToolOutcome::ToolError(message) => {
            Ok(CallToolResult::error(vec![Content::text(message)]))
        }
        ToolOutcome::Fatal(err) => {
            log::error!("Tool call failed: {}", err);
            Err(McpError::internal_error(err.to_string(), None))
        }
    }
}

fn to_mcp_tool(metadata: ToolMetadata) -> McpTool {
    let schema = match metadata.input_schema {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    McpTool::new(metadata.name, metadata.description, Arc::new(schema))
}

impl ServerHandler for ExecutorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Runs Python code in a disposable container with Playwright and a headless browser; returns what the script prints."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.mcp_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pyexec_core::{ExecutorError, Tool};
    use rmcp::model::RawContent;
    use serde_json::json;

    struct FixedTool;

    #[async_trait]
    impl Tool for FixedTool {
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata {
                name: "fixed".to_string(),
                description: "Returns a canned outcome".to_string(),
                input_schema: json!({"type": "object", "properties": {"mode": {"type": "string"}}}),
            }
        }

        async fn call(&self, arguments: Value) -> ToolOutcome {
            match arguments.get("mode").and_then(|v| v.as_str()) {
                Some("error") => ToolOutcome::ToolError("script failed".to_string()),
                Some("fatal") => ToolOutcome::Fatal(ExecutorError::Config("broken host".to_string())),
                _ => ToolOutcome::Text("ok\n".to_string()),
            }
        }
    }

    fn server() -> ExecutorServer {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Arc::new(FixedTool));
        ExecutorServer::new(registry)
    }

    fn args(mode: &str) -> Option<serde_json::Map<String, Value>> {
        match json!({ "mode": mode }) {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn test_tools_are_listed_with_schema() {
        let tools = server().mcp_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "fixed");
        assert_eq!(tools[0].input_schema["type"], "object");
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_text_outcome_is_success() {
        let result = server().dispatch("fixed", args("text")).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "ok\n");
    }

    #[tokio::test]
    async fn test_tool_error_is_flagged() {
        let result = server().dispatch("fixed", args("error")).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "script failed");
    }

    #[tokio::test]
    async fn test_fatal_is_protocol_error() {
        let err = server().dispatch("fixed", args("fatal")).await.unwrap_err();
        assert!(err.message.contains("broken host"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = server().dispatch("nope", None).await.unwrap_err();
        assert!(err.message.contains("Tool 'nope' not found"));
    }
}
