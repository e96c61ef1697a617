//! The agent loop: the heart of Aura.
//!
//! One request runs a bounded **Call → Parse → Act → Observe** cycle:
//!
//! 1. **Trim** the conversation to the context budget ([`ContextBuilder`])
//! 2. **Call** the completion client with the history, system message first
//! 3. **Parse** the reply for a tool call ([`ToolCallParser`])
//! 4. **Act**: dispatch the call ([`ToolDispatcher`]) and append the
//!    canonical call plus an `Observation: ` message, then loop back to 2
//! 5. **Answer**: anything that is not a call is formatted
//!    ([`format_final_response`]) and returned
//!
//! When streaming, the [`StreamGate`] keeps protocol JSON away from the user
//! while prose is forwarded as it arrives.

pub mod context;
pub mod dispatcher;
pub mod formatter;
pub mod loop_runner;
pub mod protocol;
pub mod stream_event;
pub mod stream_gate;
pub mod system_prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{ContextBuilder, estimate_messages_tokens, estimate_tokens};
pub use dispatcher::{ToolDispatcher, failure_observation};
pub use formatter::{ANSWER_HEADING, format_final_response};
pub use loop_runner::{AgentLoop, AgentRun, STEP_LIMIT_MESSAGE};
pub use protocol::{KnownTools, ToolCallParser, parse_unchecked, unknown_tool_observation};
pub use stream_event::AgentStreamEvent;
pub use stream_gate::{StreamGate, StreamMode};
pub use system_prompt::{LocalZone, build_system_prompt};
