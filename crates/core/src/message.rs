//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the entire system:
//! the gateway receives a user message, the agent loop appends assistant
//! tool calls and observations, and the final reply is stored back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Literal prefix of every observation message. The model is conditioned on
/// this exact text, so it must never change.
pub const OBSERVATION_PREFIX: &str = "Observation: ";

/// Title used until a conversation has a user message.
const DEFAULT_TITLE: &str = "New conversation";

/// Maximum number of characters taken from the first user message for a title.
const TITLE_MAX_CHARS: usize = 60;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, protocol rules, tool list)
    System,
    /// The end user, and tool observations re-injected for the model
    User,
    /// The AI assistant
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create an observation: a user-role message carrying a JSON-serialized
    /// tool result behind [`OBSERVATION_PREFIX`].
    pub fn observation(result: &serde_json::Value) -> Self {
        let body = serde_json::to_string(result).unwrap_or_else(|_| "null".into());
        Self::user(format!("{OBSERVATION_PREFIX}{body}"))
    }

    /// Whether this message is a tool observation rather than real user input.
    pub fn is_observation(&self) -> bool {
        self.role == Role::User && self.content.starts_with(OBSERVATION_PREFIX)
    }
}

/// A conversation is an ordered sequence of messages with shared context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Display title, derived from the first user message
    pub title: String,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::with_id(ConversationId::new())
    }

    /// Create a new empty conversation with a caller-chosen ID.
    pub fn with_id(id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_TITLE.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the conversation.
    ///
    /// The title is derived lazily: the first user message replaces the
    /// placeholder title.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        if self.title == DEFAULT_TITLE && message.role == Role::User {
            let title: String = message.content.chars().take(TITLE_MAX_CHARS).collect();
            if !title.trim().is_empty() {
                self.title = title;
            }
        }
        self.messages.push(message);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
