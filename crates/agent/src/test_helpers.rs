//! Shared test helpers for agent tests.

use aura_core::error::{ProviderError, ToolError};
use aura_core::message::Message;
use aura_core::provider::{
    Provider, ProviderRequest, ProviderResponse, StreamChunk, StreamReceiver, Usage,
};
use aura_core::tool::{ExecutionContext, Tool};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted texts.
///
/// Each call returns the next text in the queue. When streaming, the text
/// is cut into small increments. Panics if more calls are made than texts
/// provided.
pub struct SequentialMockProvider {
    texts: Vec<String>,
    call_count: Mutex<usize>,
    requests: Mutex<Vec<ProviderRequest>>,
    chunk_chars: usize,
}

impl SequentialMockProvider {
    pub fn new<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
            chunk_chars: 4,
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_text(&self, request: ProviderRequest) -> String {
        self.requests.lock().unwrap().push(request);
        let mut count = self.call_count.lock().unwrap();
        let Some(text) = self.texts.get(*count) else {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                self.texts.len()
            );
        };
        *count += 1;
        text.clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Ok(make_text_response(&self.next_text(request)))
    }

    async fn stream(&self, request: ProviderRequest) -> Result<StreamReceiver, ProviderError> {
        let text = self.next_text(request);
        let chars: Vec<char> = text.chars().collect();
        let pieces: Vec<String> = chars
            .chunks(self.chunk_chars)
            .map(|c| c.iter().collect())
            .collect();

        let (tx, rx) = tokio::sync::mpsc::channel(pieces.len() + 1);
        for piece in pieces {
            let _ = tx
                .send(Ok(StreamChunk {
                    content: Some(piece),
                    ..Default::default()
                }))
                .await;
        }
        let _ = tx
            .send(Ok(StreamChunk {
                done: true,
                ..Default::default()
            }))
            .await;
        Ok(rx)
    }
}

/// A provider with no credentials.
pub struct UnconfiguredMockProvider;

#[async_trait::async_trait]
impl Provider for UnconfiguredMockProvider {
    fn name(&self) -> &str {
        "unconfigured_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("GROQ_API_KEY is not configured".into()))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A `get_weather` stub returning a fixed report for any city.
pub struct StubWeatherTool;

#[async_trait::async_trait]
impl Tool for StubWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Current weather for a city"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {"city": {"type": "string"}}})
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let city = arguments["city"].as_str().unwrap_or("somewhere");
        Ok(serde_json::json!(format!("Weather in {city}: 18°C, clear sky")))
    }
}
