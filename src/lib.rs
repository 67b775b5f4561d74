//! Currency Rate & News Agent
//!
//! A Gemini agent bound to two tools (web search and a Python runner)
//! that answers "Convert X to Y" with a live rate, derived figures and
//! recent news as markdown, served through a one-page web shell.
//!
//! AGENT LOOP:
//! TASK → DECIDE → (TOOL → OBSERVE → DECIDE)* → FINISH | CAP

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod gemini;
pub mod models;
pub mod prompt;
pub mod reasoner;
pub mod state;
pub mod tools;
pub mod verification;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use agent::{Orchestrator, OrchestratorStatus};
pub use config::AgentConfig;
pub use error::{AgentError, ErrorKind};
pub use state::{Shell, SubmitOutcome};
