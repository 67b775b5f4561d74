//! Runtime configuration
//!
//! Read from the process environment (after `.env` is loaded by the binary):
//! - `GOOGLE_API_KEY` - Required. Gemini key (`GEMINI_API_KEY` is accepted too).
//! - `TAVILY_API_KEY` - Required. Search key.
//! - `GEMINI_MODEL` - Optional. Defaults to `gemini-1.5-pro`.
//! - `AGENT_MAX_ITERATIONS` - Optional. Reasoning rounds per request. Defaults to `20`.
//! - `SEARCH_MAX_RESULTS` - Optional. Clamped to `1..=5`. Defaults to `5`.
//! - `PYTHON_BIN` - Optional. Interpreter for the code tool. Defaults to `python3`.
//! - `CODE_TIMEOUT_SECS` - Optional. Defaults to `30`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Wall-clock deadline for one conversion.
//! - `PORT` / `API_PORT` - Optional. Shell port. Defaults to `8080`.

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
pub const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub google_api_key: String,
    pub tavily_api_key: String,
    pub model: String,
    pub max_iterations: u32,
    pub search_max_results: usize,
    pub python_bin: String,
    pub code_timeout: Duration,
    /// Deadline applied by the shell around each conversion
    pub request_timeout: Option<Duration>,
    pub port: u16,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google_api_key = non_blank("GOOGLE_API_KEY")
            .or_else(|| non_blank("GEMINI_API_KEY"))
            .ok_or_else(|| {
                AgentError::ConfigurationError(
                    "GOOGLE_API_KEY is not set; the language model cannot be reached".to_string(),
                )
            })?;

        let tavily_api_key = non_blank("TAVILY_API_KEY").ok_or_else(|| {
            AgentError::ConfigurationError(
                "TAVILY_API_KEY is not set; the search tool cannot be reached".to_string(),
            )
        })?;

        let model = non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_iterations: u32 =
            parse_var(&non_blank, "AGENT_MAX_ITERATIONS")?.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(AgentError::ConfigurationError(
                "AGENT_MAX_ITERATIONS must be at least 1".to_string(),
            ));
        }

        let search_max_results = parse_var::<usize, _>(&non_blank, "SEARCH_MAX_RESULTS")?
            .unwrap_or(MAX_SEARCH_RESULTS)
            .clamp(1, MAX_SEARCH_RESULTS);

        let python_bin = non_blank("PYTHON_BIN").unwrap_or_else(|| "python3".to_string());

        let code_timeout =
            Duration::from_secs(parse_var(&non_blank, "CODE_TIMEOUT_SECS")?.unwrap_or(30));

        let request_timeout =
            parse_var::<u64, _>(&non_blank, "REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);

        let port: u16 = match parse_var(&non_blank, "PORT")? {
            Some(port) => port,
            None => parse_var(&non_blank, "API_PORT")?.unwrap_or(8080),
        };

        Ok(Self {
            google_api_key,
            tavily_api_key,
            model,
            max_iterations,
            search_max_results,
            python_bin,
            code_timeout,
            request_timeout,
            port,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AgentError::ConfigurationError(format!("Invalid value for {}: {}", key, e))
            })
        })
        .transpose()
}
