//! Agent-level streaming events.
//!
//! `AgentStreamEvent` is the payload of every server-sent event on the
//! streaming chat endpoint. A stream carries zero or more `token` events
//! followed by exactly one `done` or `error` event.

use aura_core::message::Conversation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Text that passed the streaming gate.
    Token { token: String },

    /// The final reply and the updated conversation.
    Done {
        reply: String,
        #[serde(rename = "conversationId")]
        conversation_id: String,
        conversation: Box<Conversation>,
    },

    /// The request failed; no `done` event follows.
    Error { error: String, details: String },
}

impl AgentStreamEvent {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    pub fn error(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            details: details.into(),
        }
    }

    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Token { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::message::Message;

    #[test]
    fn token_serialization() {
        let json = serde_json::to_string(&AgentStreamEvent::token("Hel")).unwrap();
        assert_eq!(json, r#"{"type":"token","token":"Hel"}"#);
    }

    #[test]
    fn done_uses_camel_case_conversation_id() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        let id = conversation.id.to_string();

        let event = AgentStreamEvent::Done {
            reply: "### Answer\n- Hello.".into(),
            conversation_id: id.clone(),
            conversation: Box::new(conversation),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "done");
        assert_eq!(value["conversationId"], id.as_str());
        assert_eq!(value["conversation"]["messages"][0]["content"], "hi");
        assert!(event.is_terminal());
    }

    #[test]
    fn error_serialization() {
        let value = serde_json::to_value(AgentStreamEvent::error(
            "Failed to process chat request",
            "boom",
        ))
        .unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["details"], "boom");
    }

    #[test]
    fn event_type_names() {
        assert_eq!(AgentStreamEvent::token("x").event_type(), "token");
        assert_eq!(AgentStreamEvent::error("a", "b").event_type(), "error");
        assert!(!AgentStreamEvent::token("x").is_terminal());
    }

    #[test]
    fn event_deserialization() {
        let event: AgentStreamEvent =
            serde_json::from_str(r#"{"type":"token","token":"hi"}"#).unwrap();
        match event {
            AgentStreamEvent::Token { token } => assert_eq!(token, "hi"),
            _ => panic!("Wrong variant"),
        }
    }
}
