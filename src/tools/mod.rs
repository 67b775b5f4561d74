//! Tool capabilities and the fixed binding set
//!
//! The agent only ever sees two tools: web search and a code runner.
//! Both are bound once at startup and never change afterwards.

use crate::gemini::FunctionDeclaration;
use crate::models::{SearchResult, ToolKind};
use crate::Result;
use serde_json::json;
use std::sync::Arc;

pub mod python;
pub mod search;

pub use python::PythonRunner;
pub use search::TavilySearch;

/// Web search capability
#[async_trait::async_trait]
pub trait SearchTool: Send + Sync {
    fn description(&self) -> &'static str;

    /// Ordered hits, at most the configured maximum (never more than 5)
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Sandboxed code execution capability
#[async_trait::async_trait]
pub trait CodeRunner: Send + Sync {
    fn description(&self) -> &'static str;

    async fn run(&self, code: &str) -> Result<String>;
}

/// The process-wide pair of capabilities attached to an orchestrator
#[derive(Clone)]
pub struct ToolBindings {
    pub search: Arc<dyn SearchTool>,
    pub runner: Arc<dyn CodeRunner>,
}

impl ToolBindings {
    pub fn new(search: Arc<dyn SearchTool>, runner: Arc<dyn CodeRunner>) -> Self {
        Self { search, runner }
    }

    /// Function declarations advertised to the model
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        vec![
            FunctionDeclaration {
                name: ToolKind::WebSearch.name().to_string(),
                description: self.search.description().to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query"
                        }
                    },
                    "required": ["query"]
                }),
            },
            FunctionDeclaration {
                name: ToolKind::PythonRepl.name().to_string(),
                description: self.runner.description().to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Python source to run; print the values you need"
                        }
                    },
                    "required": ["code"]
                }),
            },
        ]
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-process stand-ins for the external capabilities.

    use super::*;
    use crate::error::AgentError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    pub struct FakeSearch {
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<String>>,
        pub fail_on_call: Option<usize>,
    }

    impl FakeSearch {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        pub fn failing_on(call: usize) -> Self {
            Self {
                fail_on_call: Some(call),
                ..Self::new()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchTool for FakeSearch {
        fn description(&self) -> &'static str {
            "fake search"
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail_on_call == Some(call) {
                return Err(AgentError::ToolError("search provider unavailable".to_string()));
            }
            Ok(vec![SearchResult {
                title: format!("Result for {}", query),
                url: "https://www.reuters.com/markets/currencies".to_string(),
                snippet: "Markets moved.".to_string(),
                source: "reuters.com".to_string(),
            }])
        }
    }

    pub struct FakeRunner {
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        /// Sleeps before answering
        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }
    }

    #[async_trait::async_trait]
    impl CodeRunner for FakeRunner {
        fn description(&self) -> &'static str {
            "fake runner"
        }

        async fn run(&self, _code: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok("92.00\n".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeRunner, FakeSearch};
    use super::*;

    #[test]
    fn test_declarations_cover_both_tools() {
        let bindings = ToolBindings::new(Arc::new(FakeSearch::new()), Arc::new(FakeRunner::new()));
        let declarations = bindings.declarations();
        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["web_search", "python_repl"]);
        assert_eq!(declarations[0].parameters["required"][0], "query");
        assert_eq!(declarations[1].parameters["required"][0], "code");
    }
}
