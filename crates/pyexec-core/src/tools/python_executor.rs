//! The `python-scraper-executor` tool.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::orchestrator::PythonExecutor;
use crate::outcome::ToolOutcome;
use crate::tools::{Tool, ToolMetadata};

pub const TOOL_NAME: &str = "python-scraper-executor";

pub struct PythonExecutorTool {
    executor: Arc<PythonExecutor>,
}

impl PythonExecutorTool {
    pub fn new(executor: Arc<PythonExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for PythonExecutorTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TOOL_NAME.to_string(),
            description: "Python executor tool in separate docker container, using PlayWright and headless browser for web scraping, and return output in print statements!".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Python code to be executed"
                    },
                    "libraries": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Python libraries to be installed in the container"
                    }
                },
                "required": ["code"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        self.executor.execute_arguments(&arguments).await
    }
}
