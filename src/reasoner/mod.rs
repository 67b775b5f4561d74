//! Reasoner trait and implementations
//!
//! The reasoner looks at the instruction template and the transcript so far
//! and decides the next step: search, execute code, or finish.

use crate::error::AgentError;
use crate::models::{AgentStep, TranscriptEntry};
use crate::tools::ToolBindings;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub mod gemini;
pub use gemini::GeminiReasoner;

/// One reasoning round: the chosen step plus any text emitted with it
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub step: AgentStep,
    pub thought: Option<String>,
}

impl Decision {
    pub fn step(step: AgentStep) -> Self {
        Self {
            step,
            thought: None,
        }
    }
}

/// Trait for the reasoning capability (LLM controlled)
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn decide(
        &self,
        instructions: &str,
        transcript: &[TranscriptEntry],
        tools: &ToolBindings,
    ) -> Result<Decision>;
}

/// Replays a fixed list of steps.
/// Keeps the agent loop testable without an LLM.
pub struct ScriptedReasoner {
    script: Mutex<VecDeque<AgentStep>>,
    repeat: Option<AgentStep>,
    rounds: AtomicUsize,
}

impl ScriptedReasoner {
    pub fn new(steps: Vec<AgentStep>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            repeat: None,
            rounds: AtomicUsize::new(0),
        }
    }

    /// Returns the same step forever
    pub fn looping(step: AgentStep) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(step),
            rounds: AtomicUsize::new(0),
        }
    }

    /// Number of `decide` calls so far
    pub fn rounds(&self) -> usize {
        self.rounds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn decide(
        &self,
        _instructions: &str,
        _transcript: &[TranscriptEntry],
        _tools: &ToolBindings,
    ) -> Result<Decision> {
        self.rounds.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::ExecutionError("scripted reasoner poisoned".to_string()))?
            .pop_front();

        next.or_else(|| self.repeat.clone())
            .map(Decision::step)
            .ok_or_else(|| AgentError::LlmError("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fakes::{FakeRunner, FakeSearch};
    use std::sync::Arc;

    fn bindings() -> ToolBindings {
        ToolBindings::new(Arc::new(FakeSearch::new()), Arc::new(FakeRunner::new()))
    }

    #[tokio::test]
    async fn test_script_replays_then_runs_out() {
        let reasoner = ScriptedReasoner::new(vec![AgentStep::Finish {
            output: "done".to_string(),
        }]);
        let tools = bindings();

        let decision = reasoner.decide("", &[], &tools).await.unwrap();
        assert_eq!(
            decision.step,
            AgentStep::Finish {
                output: "done".to_string()
            }
        );

        let err = reasoner.decide("", &[], &tools).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(_)));
        assert_eq!(reasoner.rounds(), 2);
    }

    #[tokio::test]
    async fn test_looping_repeats_forever() {
        let step = AgentStep::Execute {
            code: "print(1)".to_string(),
        };
        let reasoner = ScriptedReasoner::looping(step.clone());
        let tools = bindings();

        for _ in 0..5 {
            assert_eq!(reasoner.decide("", &[], &tools).await.unwrap().step, step);
        }
        assert_eq!(reasoner.rounds(), 5);
    }
}
