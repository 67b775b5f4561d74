//! Sandboxed Python runner for arithmetic and derived figures.

use crate::error::AgentError;
use crate::tools::CodeRunner;
use crate::Result;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const MAX_OUTPUT_CHARS: usize = 20_000;
const SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Runs `<interpreter> -c <code>` in a child process with an empty environment.
pub struct PythonRunner {
    interpreter: String,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl CodeRunner for PythonRunner {
    fn description(&self) -> &'static str {
        "A Python shell. Use this to execute python commands for calculations such as \
         converting amounts or percentage changes. Input should be valid python code. \
         Only printed output is returned, so print() every value you need."
    }

    async fn run(&self, code: &str) -> Result<String> {
        if code.trim().is_empty() {
            return Err(AgentError::InvalidToolInput(
                "python_repl requires non-empty code".to_string(),
            ));
        }

        debug!(interpreter = %self.interpreter, bytes = code.len(), "Running code");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.interpreter)
                .arg("-c")
                .arg(code)
                .env_clear()
                .env("PATH", SANDBOX_PATH)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            AgentError::ToolError(format!(
                "Code execution timed out after {} seconds",
                self.timeout.as_secs()
            ))
        })?
        .map_err(|e| {
            AgentError::ToolError(format!("Failed to start {}: {}", self.interpreter, e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            warn!(code = ?output.status.code(), "Code execution failed");
            return Err(AgentError::ToolError(format!(
                "Code exited with {}: {}",
                output.status.code().unwrap_or(-1),
                truncate(stderr.trim(), 2_000)
            )));
        }

        Ok(truncate(&stdout, MAX_OUTPUT_CHARS))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... [output truncated]", head)
    }
}
