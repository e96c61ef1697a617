//! In-memory conversation storage.

use aura_core::message::{Conversation, ConversationId, Message};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Maximum number of in-memory conversations before the stalest is evicted.
pub const MAX_CONVERSATIONS: usize = 1_000;

/// Conversations keyed by id, shared across requests.
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    capacity: usize,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CONVERSATIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(id).cloned()
    }

    /// Stored messages of a conversation, empty when unknown.
    pub async fn history(&self, id: Option<&str>) -> Vec<Message> {
        let Some(id) = id else {
            return Vec::new();
        };
        self.conversations
            .read()
            .await
            .get(id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Append one exchange. An unknown or missing id starts a new
    /// conversation with a fresh id.
    pub async fn record(&self, id: Option<&str>, user: Message, assistant: Message) -> Conversation {
        let mut conversations = self.conversations.write().await;

        let key = match id {
            Some(id) if conversations.contains_key(id) => id.to_string(),
            _ => {
                if conversations.len() >= self.capacity {
                    if let Some(stalest) = conversations
                        .iter()
                        .min_by_key(|(_, c)| c.updated_at)
                        .map(|(k, _)| k.clone())
                    {
                        debug!(conversation_id = %stalest, "Evicting conversation");
                        conversations.remove(&stalest);
                    }
                }
                let conversation = Conversation::with_id(ConversationId::new());
                let key = conversation.id.to_string();
                conversations.insert(key.clone(), conversation);
                key
            }
        };

        let conversation = conversations
            .entry(key)
            .or_insert_with(Conversation::new);
        conversation.push(user);
        conversation.push(assistant);
        conversation.clone()
    }

    /// Most recently updated first, at most `limit`.
    pub async fn list(&self, limit: usize) -> Vec<Conversation> {
        let mut all: Vec<Conversation> = self.conversations.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all.truncate(limit);
        all
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.conversations.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
