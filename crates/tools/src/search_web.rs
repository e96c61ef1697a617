//! Web search tool backed by the Tavily search API.

use crate::{http_client, request_error, required_str};
use async_trait::async_trait;
use aura_config::SearchConfig;
use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, Tool};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const NAME: &str = "search_web";

pub struct SearchWebTool {
    config: SearchConfig,
    timeout: Duration,
    client: reqwest::Client,
}

impl SearchWebTool {
    pub fn new(config: SearchConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            client: http_client(timeout),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search the internet for current information"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let query = required_str(&arguments, "query")?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured {
                tool_name: NAME.into(),
                reason: "TAVILY_API_KEY is not set".into(),
            })?;

        debug!(tool = NAME, query, "Searching the web");

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "api_key": api_key,
                "query": query,
                "max_results": self.config.max_results,
            }))
            .send()
            .await
            .map_err(|e| request_error(NAME, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: format!("search API returned {}", response.status()),
            });
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: NAME.into(),
                    reason: format!("unreadable search response: {e}"),
                })?;

        if body.results.is_empty() {
            return Ok(serde_json::json!(format!("No results found for \"{query}\".")));
        }

        let lines: Vec<String> = body
            .results
            .iter()
            .map(|r| format!("{}: {}", r.title, r.content))
            .collect();
        Ok(serde_json::Value::String(lines.join("\n")))
    }
}
