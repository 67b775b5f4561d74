//! Execution engine for tool steps
//!
//! Dispatches a single `AgentStep` to the matching bound capability.
//! No LLM here, and no retries: a failing tool fails the request.

use crate::error::AgentError;
use crate::models::{AgentStep, ToolKind};
use crate::tools::ToolBindings;
use crate::Result;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Result of one tool invocation, ready to be appended to the transcript
#[derive(Debug, Clone)]
pub struct Observation {
    pub tool: ToolKind,
    pub output: Value,
    pub execution_time_ms: u64,
}

pub struct ExecutionEngine {
    bindings: ToolBindings,
}

impl ExecutionEngine {
    pub fn new(bindings: ToolBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &ToolBindings {
        &self.bindings
    }

    pub async fn execute(&self, step: &AgentStep) -> Result<Observation> {
        let start = Instant::now();

        let (tool, result) = match step {
            AgentStep::Search { query } => {
                debug!(query = %query, "Dispatching web_search");
                let result = self
                    .bindings
                    .search
                    .search(query)
                    .await
                    .map(|hits| json!({ "results": hits }));
                (ToolKind::WebSearch, result)
            }
            AgentStep::Execute { code } => {
                debug!(bytes = code.len(), "Dispatching python_repl");
                let result = self
                    .bindings
                    .runner
                    .run(code)
                    .await
                    .map(|stdout| json!({ "output": stdout }));
                (ToolKind::PythonRepl, result)
            }
            AgentStep::Finish { .. } => {
                return Err(AgentError::ExecutionError(
                    "Finish is not a tool step".to_string(),
                ));
            }
        };

        let execution_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                debug!(tool = %tool, execution_time_ms, "Tool step completed");
                Ok(Observation {
                    tool,
                    output,
                    execution_time_ms,
                })
            }
            Err(e) => {
                warn!(tool = %tool, error = %e, "Tool execution failed");
                Err(AgentError::ExecutionError(format!("{} failed: {}", tool, e)))
            }
        }
    }
}
