//! Query orchestrator - the agent loop
//!
//! TASK → DECIDE → (SEARCH | EXECUTE → OBSERVE → DECIDE)* → FINISH
//!
//! One request at a time per handle. Every round is one call to the
//! reasoner; the round count is capped.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::execution::ExecutionEngine;
use crate::gemini::GeminiClient;
use crate::models::{AgentRun, AgentStep, ConversionRequest, CurrencyCode, TranscriptEntry};
use crate::prompt::build_instructions;
use crate::reasoner::{GeminiReasoner, Reasoner};
use crate::tools::{PythonRunner, TavilySearch, ToolBindings};
use crate::verification::{create_default_verification_engine, VerificationEngine};
use crate::Result;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorStatus {
    Idle,
    Running,
}

pub struct Orchestrator {
    instructions: String,
    reasoner: Box<dyn Reasoner>,
    execution_engine: ExecutionEngine,
    verification_engine: VerificationEngine,
    max_iterations: u32,
    running: AtomicBool,
}

/// Clears the running flag however the loop exits
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Orchestrator {
    pub fn new(reasoner: Box<dyn Reasoner>, bindings: ToolBindings, max_iterations: u32) -> Self {
        Self {
            instructions: build_instructions(),
            reasoner,
            execution_engine: ExecutionEngine::new(bindings),
            verification_engine: create_default_verification_engine(),
            max_iterations,
            running: AtomicBool::new(false),
        }
    }

    /// Bind Gemini, Tavily and the Python runner from configuration
    pub fn initialize(config: &AgentConfig) -> Result<Self> {
        let client = GeminiClient::new(config.google_api_key.clone(), config.model.clone())?;
        let search = TavilySearch::new(config.tavily_api_key.clone(), config.search_max_results)?;
        let runner = PythonRunner::new(config.python_bin.clone(), config.code_timeout);

        info!(
            model = %client.model(),
            max_iterations = config.max_iterations,
            search_max_results = config.search_max_results,
            "Orchestrator initialized"
        );

        Ok(Self::new(
            Box::new(GeminiReasoner::new(client)),
            ToolBindings::new(Arc::new(search), Arc::new(runner)),
            config.max_iterations,
        ))
    }

    pub fn status(&self) -> OrchestratorStatus {
        if self.running.load(Ordering::SeqCst) {
            OrchestratorStatus::Running
        } else {
            OrchestratorStatus::Idle
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Markdown answer for one currency pair
    pub async fn convert(&self, from: CurrencyCode, to: CurrencyCode) -> Result<String> {
        self.run(&ConversionRequest::new(from, to))
            .await
            .map(|run| run.output)
    }

    /// Drive one request through the agent loop
    pub async fn run(&self, request: &ConversionRequest) -> Result<AgentRun> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AgentError::ExecutionError(
                "A conversion is already running on this orchestrator".to_string(),
            ));
        }
        let _guard = RunningGuard(&self.running);

        let start_time = Instant::now();
        let task = request.task();
        info!(task = %task, "Starting conversion");

        let mut transcript = vec![TranscriptEntry::Task { text: task }];
        let mut trace: Vec<String> = Vec::new();
        let tools = self.execution_engine.bindings();

        for round in 1..=self.max_iterations {
            debug!(round, transcript_len = transcript.len(), "Reasoning round");

            let decision = self
                .reasoner
                .decide(&self.instructions, &transcript, tools)
                .await
                .map_err(|e| match e {
                    AgentError::ExecutionError(_) => e,
                    other => AgentError::ExecutionError(other.to_string()),
                })?;

            if let Some(thought) = decision.thought {
                transcript.push(TranscriptEntry::Thought { text: thought });
            }

            let step = decision.step;
            if let AgentStep::Finish { output } = step {
                let output = output.trim().to_string();
                if output.is_empty() {
                    return Err(AgentError::ExecutionError(
                        "Model produced an empty answer".to_string(),
                    ));
                }

                let checks = self.verification_engine.verify(request, &output);
                trace.push(format!(
                    "VERIFY: {} / {} report checks passed",
                    checks.checks.iter().filter(|c| c.passed).count(),
                    checks.checks.len()
                ));
                trace.push(format!("FINISH: round {}", round));

                let elapsed_ms = start_time.elapsed().as_millis() as u64;
                info!(rounds = round, elapsed_ms, "Conversion complete");

                return Ok(AgentRun {
                    output,
                    trace,
                    iterations: round,
                    elapsed_ms,
                });
            }

            let observation = self.execution_engine.execute(&step).await?;
            trace.push(format!(
                "OBSERVE: round {} ({}) - {} ms",
                round, observation.tool, observation.execution_time_ms
            ));

            transcript.push(TranscriptEntry::ToolCall { step });
            transcript.push(TranscriptEntry::Observation {
                tool: observation.tool,
                output: observation.output,
            });
        }

        warn!(
            max_iterations = self.max_iterations,
            "Iteration cap reached without a final answer"
        );
        Err(AgentError::IterationCapExceeded(self.max_iterations))
    }
}
