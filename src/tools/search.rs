//! Tavily-backed web search.

use crate::error::AgentError;
use crate::models::{source_name, SearchResult};
use crate::tools::SearchTool;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const TAVILY_URL: &str = "https://api.tavily.com/search";

pub struct TavilySearch {
    client: Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
}

impl TavilySearch {
    pub fn new(api_key: String, max_results: usize) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::ConfigurationError(
                "Tavily API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AgentError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: TAVILY_URL.to_string(),
            max_results: max_results.clamp(1, crate::config::MAX_SEARCH_RESULTS),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl SearchTool for TavilySearch {
    fn description(&self) -> &'static str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for current exchange rates and recent financial news. Input should be a search query."
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(AgentError::InvalidToolInput(
                "web_search requires a non-empty query".to_string(),
            ));
        }

        debug!(query, max_results = self.max_results, "Tavily search");

        let body = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: "advanced",
            include_answer: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ToolError(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Tavily returned an error");
            return Err(AgentError::ToolError(format!(
                "Search API returned {}: {}",
                status, text
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ToolError(format!("Invalid search response: {}", e)))?;

        Ok(parsed.into_results(self.max_results))
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyResponse {
    fn into_results(self, max_results: usize) -> Vec<SearchResult> {
        self.results
            .into_iter()
            .take(max_results)
            .map(|hit| SearchResult {
                source: source_name(&hit.url),
                title: hit.title,
                url: hit.url,
                snippet: hit.content,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hits_are_capped_and_sourced() {
        let hits: Vec<_> = (0..8)
            .map(|i| {
                json!({
                    "title": format!("Headline {}", i),
                    "url": format!("https://www.example{}.com/a", i),
                    "content": "Summary",
                    "score": 0.9
                })
            })
            .collect();
        let response: TavilyResponse =
            serde_json::from_value(json!({"query": "USD EUR", "results": hits})).unwrap();

        let results = response.into_results(5);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].title, "Headline 0");
        assert_eq!(results[0].source, "example0.com");
        assert_eq!(results[4].snippet, "Summary");
    }

    #[test]
    fn test_request_body_shape() {
        let body = TavilyRequest {
            query: "USD to EUR exchange rate xe.com",
            max_results: 5,
            search_depth: "advanced",
            include_answer: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["max_results"], 5);
        assert_eq!(value["query"], "USD to EUR exchange rate xe.com");
    }

    #[test]
    fn test_max_results_clamped() {
        let search = TavilySearch::new("key".to_string(), 50).unwrap();
        assert_eq!(search.max_results, 5);
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_request() {
        let search = TavilySearch::new("key".to_string(), 5)
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unreachable");
        let err = search.search("   ").await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidToolInput(_)));
    }
}
