//! Gemini-powered reasoner
//!
//! Replays the transcript as a Gemini conversation and maps the returned
//! function call (if any) onto an `AgentStep`.

use crate::error::AgentError;
use crate::gemini::{Content, FunctionCall, GeminiClient, ModelTurn, Part};
use crate::models::{AgentStep, ToolKind, TranscriptEntry};
use crate::reasoner::{Decision, Reasoner};
use crate::tools::ToolBindings;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

pub struct GeminiReasoner {
    client: GeminiClient,
}

impl GeminiReasoner {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Reasoner for GeminiReasoner {
    async fn decide(
        &self,
        instructions: &str,
        transcript: &[TranscriptEntry],
        tools: &ToolBindings,
    ) -> Result<Decision> {
        let contents = to_contents(transcript);
        let turn = self
            .client
            .generate(instructions, contents, tools.declarations())
            .await?;
        decision_from_turn(turn)
    }
}

/// Transcript → Gemini conversation, merging consecutive same-role parts
fn to_contents(transcript: &[TranscriptEntry]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();

    for entry in transcript {
        let (role, part) = match entry {
            TranscriptEntry::Task { text } => ("user", Part::text(text.clone())),
            TranscriptEntry::Thought { text } => ("model", Part::text(text.clone())),
            TranscriptEntry::ToolCall { step } => match step_to_call(step) {
                Some(call) => ("model", Part::call(call)),
                None => continue,
            },
            TranscriptEntry::Observation { tool, output } => {
                ("user", Part::response(tool.name(), output.clone()))
            }
        };

        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => last.parts.push(part),
            _ => contents.push(match role {
                "model" => Content::model(vec![part]),
                _ => Content::user(vec![part]),
            }),
        }
    }

    contents
}

fn step_to_call(step: &AgentStep) -> Option<FunctionCall> {
    match step {
        AgentStep::Search { query } => Some(FunctionCall {
            name: ToolKind::WebSearch.name().to_string(),
            args: json!({ "query": query }),
        }),
        AgentStep::Execute { code } => Some(FunctionCall {
            name: ToolKind::PythonRepl.name().to_string(),
            args: json!({ "code": code }),
        }),
        AgentStep::Finish { .. } => None,
    }
}

fn string_arg(args: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| args.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Model turn → next step. Only the first function call is honoured.
fn decision_from_turn(turn: ModelTurn) -> Result<Decision> {
    let text = turn.text.trim().to_string();

    let Some(call) = turn.calls.first() else {
        if text.is_empty() {
            return Err(AgentError::LlmError(
                "Model returned neither text nor a tool call".to_string(),
            ));
        }
        return Ok(Decision::step(AgentStep::Finish { output: text }));
    };

    if turn.calls.len() > 1 {
        warn!(
            requested = turn.calls.len(),
            "Model requested parallel tool calls; running only the first"
        );
    }

    let tool = ToolKind::from_name(&call.name).ok_or_else(|| {
        AgentError::LlmError(format!("Model requested unknown tool '{}'", call.name))
    })?;

    let step = match tool {
        ToolKind::WebSearch => AgentStep::Search {
            query: string_arg(&call.args, &["query", "input"]).ok_or_else(|| {
                AgentError::InvalidToolInput("web_search call is missing 'query'".to_string())
            })?,
        },
        ToolKind::PythonRepl => AgentStep::Execute {
            code: string_arg(&call.args, &["code", "query", "input"]).ok_or_else(|| {
                AgentError::InvalidToolInput("python_repl call is missing 'code'".to_string())
            })?,
        },
    };

    Ok(Decision {
        step,
        thought: (!text.is_empty()).then_some(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(text: &str, calls: Vec<FunctionCall>) -> ModelTurn {
        ModelTurn {
            text: text.to_string(),
            calls,
            finish_reason: Some("STOP".to_string()),
        }
    }

    #[test]
    fn test_text_only_turn_finishes() {
        let decision = decision_from_turn(turn("# USD to EUR\n", vec![])).unwrap();
        assert_eq!(
            decision.step,
            AgentStep::Finish {
                output: "# USD to EUR".to_string()
            }
        );
    }

    #[test]
    fn test_search_call_maps_to_search_step() {
        let decision = decision_from_turn(turn(
            "Fetching the rate first.",
            vec![FunctionCall {
                name: "web_search".to_string(),
                args: json!({"query": "xe.com USD EUR"}),
            }],
        ))
        .unwrap();
        assert_eq!(
            decision.step,
            AgentStep::Search {
                query: "xe.com USD EUR".to_string()
            }
        );
        assert_eq!(decision.thought.as_deref(), Some("Fetching the rate first."));
    }

    #[test]
    fn test_only_first_of_parallel_calls_is_taken() {
        let decision = decision_from_turn(turn(
            "",
            vec![
                FunctionCall {
                    name: "python_repl".to_string(),
                    args: json!({"query": "print(100 * 0.92)"}),
                },
                FunctionCall {
                    name: "web_search".to_string(),
                    args: json!({"query": "EUR news"}),
                },
            ],
        ))
        .unwrap();
        assert_eq!(
            decision.step,
            AgentStep::Execute {
                code: "print(100 * 0.92)".to_string()
            }
        );
        assert!(decision.thought.is_none());
    }

    #[test]
    fn test_malformed_turns_are_errors() {
        assert!(decision_from_turn(turn("   ", vec![])).is_err());
        assert!(decision_from_turn(turn(
            "",
            vec![FunctionCall {
                name: "shell".to_string(),
                args: json!({}),
            }]
        ))
        .is_err());
        assert!(decision_from_turn(turn(
            "",
            vec![FunctionCall {
                name: "web_search".to_string(),
                args: json!({"q": 1}),
            }]
        ))
        .is_err());
    }

    #[test]
    fn test_transcript_roles_alternate() {
        let transcript = vec![
            TranscriptEntry::Task {
                text: "Convert USD to EUR".to_string(),
            },
            TranscriptEntry::Thought {
                text: "Searching.".to_string(),
            },
            TranscriptEntry::ToolCall {
                step: AgentStep::Search {
                    query: "USD EUR".to_string(),
                },
            },
            TranscriptEntry::Observation {
                tool: ToolKind::WebSearch,
                output: json!({"results": []}),
            },
        ];

        let contents = to_contents(&transcript);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));
        assert_eq!(contents[1].parts.len(), 2);
        assert_eq!(
            contents[1].parts[1].function_call.as_ref().unwrap().name,
            "web_search"
        );
        assert_eq!(contents[2].role.as_deref(), Some("user"));
        assert_eq!(
            contents[2].parts[0].function_response.as_ref().unwrap().name,
            "web_search"
        );
    }
}
