//! The bounded step controller.

use crate::dispatcher::ToolDispatcher;
use crate::formatter::format_final_response;
use crate::protocol::{KnownTools, ToolCallParser, parse_unchecked, unknown_tool_observation};
use crate::stream_event::AgentStreamEvent;
use crate::stream_gate::StreamGate;
use crate::system_prompt::{LocalZone, build_system_prompt};
use aura_core::error::{Error, Result};
use aura_core::message::{Message, Role};
use aura_core::provider::{Provider, ProviderRequest};
use aura_core::tool::{ExecutionContext, ToolRegistry};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Returned when the step budget runs out before a final answer.
pub const STEP_LIMIT_MESSAGE: &str =
    "I couldn't complete this request within the step limit. Please try rephrasing or breaking it into smaller questions.";

const DEFAULT_MAX_STEPS: usize = 6;
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of one request.
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Formatted final answer.
    pub answer: String,
    /// Model round trips taken.
    pub steps: usize,
    /// Tool invocations dispatched, recovered unknown tools excluded.
    pub tool_calls_made: usize,
    /// The request-local message log, system message first.
    pub transcript: Vec<Message>,
}

/// Orchestrates model calls and tool execution for a single request.
///
/// One `AgentLoop` is built at startup and shared; all per-request state
/// lives inside [`AgentLoop::run`].
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_steps: usize,
    dispatcher: ToolDispatcher,
    parser: ToolCallParser,
    system_prompt: Option<String>,
    assistant_name: String,
    zone: LocalZone,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        let parser = ToolCallParser::new(KnownTools::from_registry(&tools));
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            max_steps: DEFAULT_MAX_STEPS,
            dispatcher: ToolDispatcher::new(tools, DEFAULT_TOOL_TIMEOUT),
            parser,
            system_prompt: None,
            assistant_name: "Aura".into(),
            zone: LocalZone::default(),
        }
    }

    /// Build a loop from application configuration.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &aura_config::AppConfig,
    ) -> Self {
        let mut agent = Self::new(provider, config.model.clone(), tools)
            .with_temperature(config.temperature)
            .with_max_steps(config.agent.max_steps)
            .with_tool_timeout(Duration::from_secs(config.tools.timeout_secs))
            .with_assistant(
                config.agent.assistant_name.clone(),
                LocalZone::from_config(&config.agent),
            );
        agent.max_tokens = config.max_tokens;
        agent
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the step budget. Values below one are raised to one.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher = ToolDispatcher::new(Arc::clone(self.dispatcher.registry()), timeout);
        self
    }

    /// Use a fixed system prompt instead of the generated one.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Name and timezone used by the generated system prompt.
    pub fn with_assistant(mut self, name: impl Into<String>, zone: LocalZone) -> Self {
        self.assistant_name = name.into();
        self.zone = zone;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        self.dispatcher.registry()
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// The system message for a request starting now.
    pub fn system_prompt(&self) -> String {
        match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => build_system_prompt(&self.assistant_name, self.tools(), Utc::now(), &self.zone),
        }
    }

    /// Run one request to a final answer.
    ///
    /// With a `sink`, each step is streamed and text that passes the
    /// [`StreamGate`] is forwarded as `token` events. The terminal `done` or
    /// `error` event is left to the caller.
    pub async fn run(
        &self,
        history: Vec<Message>,
        ctx: &ExecutionContext,
        sink: Option<&mpsc::Sender<AgentStreamEvent>>,
    ) -> Result<AgentRun> {
        let mut transcript = with_leading_system(history, || self.system_prompt());

        let mut tool_calls_made = 0;

        for step in 1..=self.max_steps {
            debug!(step, messages = transcript.len(), "Agent step");

            let (text, emitted) = match sink {
                Some(sink) => self.stream_step(&transcript, sink).await?,
                None => (self.complete_step(&transcript).await?, false),
            };

            if let Some(call) = self.parser.parse(&text) {
                info!(step, tool = %call.tool, "Tool call");
                let result = self.dispatcher.dispatch(&call, ctx).await;
                transcript.push(Message::assistant(call.to_protocol_json()));
                transcript.push(Message::observation(&result));
                tool_calls_made += 1;
                continue;
            }

            if let Some(call) = parse_unchecked(&text) {
                warn!(step, tool = %call.tool, "Model called an unknown tool");
                let observation = unknown_tool_observation(&call.tool, &self.parser.known().names());
                transcript.push(Message::assistant(call.to_protocol_json()));
                transcript.push(Message::observation(&observation));
                continue;
            }

            let answer = format_final_response(&text);
            if !emitted {
                flush(sink, &answer).await?;
            }
            info!(step, tool_calls_made, "Final answer");
            return Ok(AgentRun {
                answer,
                steps: step,
                tool_calls_made,
                transcript,
            });
        }

        warn!(max_steps = self.max_steps, "Step limit reached");
        let answer = format_final_response(STEP_LIMIT_MESSAGE);
        flush(sink, &answer).await?;
        Ok(AgentRun {
            answer,
            steps: self.max_steps,
            tool_calls_made,
            transcript,
        })
    }

    fn request(&self, transcript: &[Message], stream: bool) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: transcript.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream,
        }
    }

    async fn complete_step(&self, transcript: &[Message]) -> Result<String> {
        let response = self.provider.complete(self.request(transcript, false)).await?;
        Ok(response.message.content)
    }

    /// Stream one step through a fresh gate. Returns the full text and
    /// whether any of it reached the sink.
    async fn stream_step(
        &self,
        transcript: &[Message],
        sink: &mpsc::Sender<AgentStreamEvent>,
    ) -> Result<(String, bool)> {
        let mut rx = self.provider.stream(self.request(transcript, true)).await?;
        let mut gate = StreamGate::new();

        while let Some(chunk) = rx.recv().await {
            let chunk = chunk?;
            if let Some(delta) = chunk.content.as_deref() {
                if let Some(visible) = gate.push(delta) {
                    sink.send(AgentStreamEvent::token(visible))
                        .await
                        .map_err(|_| Error::StreamClosed)?;
                }
            }
            if chunk.done {
                break;
            }
        }

        let emitted = gate.emitted();
        Ok((gate.into_text(), emitted))
    }
}

/// Keep a system message only at index 0, adding the default one when the
/// history does not start with its own. Later system entries are dropped.
fn with_leading_system(history: Vec<Message>, default_prompt: impl FnOnce() -> String) -> Vec<Message> {
    let mut messages = history.into_iter();
    let mut transcript = Vec::with_capacity(messages.len() + 1);

    match messages.next() {
        Some(first) if first.role == Role::System => transcript.push(first),
        first => {
            transcript.push(Message::system(default_prompt()));
            transcript.extend(first);
        }
    }

    let before = transcript.len() + messages.len();
    transcript.extend(messages.filter(|m| m.role != Role::System));
    let dropped = before - transcript.len();
    if dropped > 0 {
        warn!(dropped, "Dropped system messages found after the start of the history");
    }
    transcript
}

/// Send the whole formatted answer as one token event.
async fn flush(sink: Option<&mpsc::Sender<AgentStreamEvent>>, answer: &str) -> Result<()> {
    if let Some(sink) = sink {
        sink.send(AgentStreamEvent::token(answer))
            .await
            .map_err(|_| Error::StreamClosed)?;
    }
    Ok(())
}
