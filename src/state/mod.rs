//! Session state for the presentation shell
//!
//! One process, one session: the current selection, whether a request is in
//! flight, the single retained result and the last error notice. Only
//! `Shell::submit` writes the result slot.

use crate::agent::Orchestrator;
use crate::error::AgentError;
use crate::models::{currency_catalog, ConversionRequest, CurrencyCode, CurrencyOption};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub selection: ConversionRequest,
    pub busy: bool,
    pub result: Option<String>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            selection: ConversionRequest::default(),
            busy: false,
            result: None,
            error: None,
            updated_at: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed,
    Failed(String),
    AlreadyRunning,
}

/// Everything the page needs to draw itself
#[derive(Debug, Clone, Serialize)]
pub struct ShellView {
    pub session_id: Uuid,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub busy: bool,
    pub result: Option<String>,
    pub error: Option<String>,
    pub updated_at: Option<String>,
    pub currencies: Vec<CurrencyOption>,
}

pub struct Shell {
    orchestrator: Arc<Orchestrator>,
    session: RwLock<SessionState>,
    request_timeout: Option<Duration>,
}

impl Shell {
    pub fn new(orchestrator: Arc<Orchestrator>, request_timeout: Option<Duration>) -> Self {
        Self {
            orchestrator,
            session: RwLock::new(SessionState::new()),
            request_timeout,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn select_pair(&self, from: CurrencyCode, to: CurrencyCode) -> ConversionRequest {
        let mut session = self.session.write().await;
        session.selection = ConversionRequest::new(from, to);
        session.selection
    }

    /// Exchange the two selections. Never issues a request.
    pub async fn swap(&self) -> ConversionRequest {
        let mut session = self.session.write().await;
        session.selection = session.selection.swap();
        session.selection
    }

    /// Run one conversion for the current selection.
    ///
    /// The session lock is not held while the orchestrator works.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut session = self.session.write().await;
            if session.busy {
                return SubmitOutcome::AlreadyRunning;
            }
            session.busy = true;
            session.error = None;
            session.selection
        };

        info!(from = %request.from, to = %request.to, "Submitting conversion");

        let convert = self.orchestrator.convert(request.from, request.to);
        let result = match self.request_timeout {
            Some(deadline) => tokio::time::timeout(deadline, convert)
                .await
                .unwrap_or_else(|_| {
                    Err(AgentError::ExecutionError(format!(
                        "Request timed out after {:?}",
                        deadline
                    )))
                }),
            None => convert.await,
        };

        let mut session = self.session.write().await;
        session.busy = false;

        match result {
            Ok(markdown) => {
                session.result = Some(markdown);
                session.updated_at = Some(Utc::now());
                SubmitOutcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed; keeping previous result");
                let message = format!("An error occurred: {}", e);
                session.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn render(&self) -> ShellView {
        let session = self.session.read().await;
        ShellView {
            session_id: session.session_id,
            from: session.selection.from,
            to: session.selection.to,
            busy: session.busy,
            result: session.result.clone(),
            error: session.error.clone(),
            updated_at: session.updated_at.map(|t| t.to_rfc3339()),
            currencies: currency_catalog(),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.session.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentStep;
    use crate::reasoner::ScriptedReasoner;
    use crate::tools::fakes::{FakeRunner, FakeSearch};
    use crate::tools::ToolBindings;

    const REPORT: &str = "# USD to INR\n\nFebruary 12, 2025: 1 USD = 86.9 INR";

    fn shell_with(steps: Vec<AgentStep>, search: FakeSearch) -> Shell {
        let orchestrator = Orchestrator::new(
            Box::new(ScriptedReasoner::new(steps)),
            ToolBindings::new(Arc::new(search), Arc::new(FakeRunner::new())),
            20,
        );
        Shell::new(Arc::new(orchestrator), None)
    }

    fn finish(output: &str) -> AgentStep {
        AgentStep::Finish {
            output: output.to_string(),
        }
    }

    #[tokio::test]
    async fn test_initial_render_is_empty() {
        let shell = shell_with(vec![], FakeSearch::new());
        let view = shell.render().await;
        assert_eq!(view.from, CurrencyCode::Usd);
        assert_eq!(view.to, CurrencyCode::Inr);
        assert!(view.result.is_none());
        assert!(view.error.is_none());
        assert_eq!(view.currencies.len(), 15);
    }

    #[tokio::test]
    async fn test_swap_does_not_submit() {
        let reasoner_script = vec![finish(REPORT)];
        let shell = shell_with(reasoner_script, FakeSearch::new());

        shell.select_pair(CurrencyCode::Gbp, CurrencyCode::Chf).await;
        let swapped = shell.swap().await;
        assert_eq!(swapped, ConversionRequest::new(CurrencyCode::Chf, CurrencyCode::Gbp));
        let restored = shell.swap().await;
        assert_eq!(restored, ConversionRequest::new(CurrencyCode::Gbp, CurrencyCode::Chf));

        assert!(shell.render().await.result.is_none());
    }

    #[tokio::test]
    async fn test_success_fills_slot() {
        let shell = shell_with(vec![finish(REPORT)], FakeSearch::new());
        assert_eq!(shell.submit().await, SubmitOutcome::Completed);

        let view = shell.render().await;
        assert_eq!(view.result.as_deref(), Some(REPORT));
        assert!(view.updated_at.is_some());
        assert!(!view.busy);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result() {
        let steps = vec![
            finish(REPORT),
            AgentStep::Search {
                query: "USD INR".to_string(),
            },
            finish("never reached"),
        ];
        let shell = shell_with(steps, FakeSearch::failing_on(1));

        assert_eq!(shell.submit().await, SubmitOutcome::Completed);
        let before = shell.snapshot().await.result;

        let outcome = shell.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.starts_with("An error occurred:")));

        let after = shell.snapshot().await;
        assert_eq!(after.result, before);
        assert!(after.error.is_some());
        assert!(!after.busy);
    }

    #[tokio::test]
    async fn test_failure_on_empty_slot_stays_empty() {
        let shell = shell_with(
            vec![AgentStep::Search {
                query: "USD INR".to_string(),
            }],
            FakeSearch::failing_on(1),
        );
        assert!(matches!(shell.submit().await, SubmitOutcome::Failed(_)));
        assert!(shell.render().await.result.is_none());
    }

    #[tokio::test]
    async fn test_busy_session_rejects_second_submit() {
        let shell = shell_with(vec![finish(REPORT)], FakeSearch::new());
        shell.session.write().await.busy = true;
        assert_eq!(shell.submit().await, SubmitOutcome::AlreadyRunning);
    }

    #[tokio::test]
    async fn test_next_success_clears_error() {
        let steps = vec![
            AgentStep::Search {
                query: "USD INR".to_string(),
            },
            finish(REPORT),
        ];
        let shell = shell_with(steps, FakeSearch::failing_on(1));

        assert!(matches!(shell.submit().await, SubmitOutcome::Failed(_)));
        assert_eq!(shell.submit().await, SubmitOutcome::Completed);
        assert!(shell.render().await.error.is_none());
    }

    #[tokio::test]
    async fn test_deadline_expiry_fails_and_clears_busy() {
        let orchestrator = Orchestrator::new(
            Box::new(ScriptedReasoner::new(vec![
                finish(REPORT),
                AgentStep::Execute {
                    code: "import time; time.sleep(5)".to_string(),
                },
                finish("never reached"),
            ])),
            ToolBindings::new(
                Arc::new(FakeSearch::new()),
                Arc::new(FakeRunner::slow(Duration::from_secs(5))),
            ),
            20,
        );
        let shell = Shell::new(Arc::new(orchestrator), Some(Duration::from_millis(200)));

        assert_eq!(shell.submit().await, SubmitOutcome::Completed);

        let outcome = shell.submit().await;
        match outcome {
            SubmitOutcome::Failed(message) => {
                assert!(message.starts_with("An error occurred: Execution error:"));
                assert!(message.contains("timed out after 200ms"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }

        let after = shell.snapshot().await;
        assert_eq!(after.result.as_deref(), Some(REPORT));
        assert!(!after.busy);
        assert_eq!(
            shell.orchestrator().status(),
            crate::agent::OrchestratorStatus::Idle
        );
    }
}
