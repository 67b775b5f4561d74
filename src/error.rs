//! Error types for the currency agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Coarse classification surfaced to callers.
///
/// Configuration failures happen once at startup and are fatal; everything
/// else belongs to a single `convert` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Execution,
}

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Startup
    // =============================

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // =============================
    // Per-request failures
    // =============================

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Iteration cap of {0} exceeded without a final answer")]
    IterationCapExceeded(u32),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::ConfigurationError(_) => ErrorKind::Configuration,
            _ => ErrorKind::Execution,
        }
    }

    pub fn is_execution_error(&self) -> bool {
        self.kind() == ErrorKind::Execution
    }
}
