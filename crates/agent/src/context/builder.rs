//! Bounded history for one request.

use super::token::{estimate_messages_tokens, estimate_tokens};
use aura_core::message::Message;
use tracing::debug;

/// Trims persisted history plus the new user message to a bounded list.
///
/// Keeps the `max_messages` most recent messages, then drops the oldest
/// while the estimated token count exceeds `token_budget`. Never returns
/// fewer than one message when given at least one.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    max_messages: usize,
    token_budget: usize,
}

impl ContextBuilder {
    pub fn new(max_messages: usize, token_budget: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            token_budget,
        }
    }

    pub fn from_config(config: &aura_config::ContextConfig) -> Self {
        Self::new(config.max_messages, config.token_budget)
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Build the bounded list from stored history and the incoming message.
    pub fn build(&self, history: &[Message], new_message: Message) -> Vec<Message> {
        let mut all = Vec::with_capacity(history.len() + 1);
        all.extend_from_slice(history);
        all.push(new_message);
        self.trim(all)
    }

    /// Trim an already-assembled list.
    pub fn trim(&self, messages: Vec<Message>) -> Vec<Message> {
        let input_len = messages.len();
        let skip = input_len.saturating_sub(self.max_messages);
        let mut kept: Vec<Message> = messages.into_iter().skip(skip).collect();

        let mut tokens = estimate_messages_tokens(&kept);
        let mut dropped = 0;
        while tokens > self.token_budget && kept.len() > 1 {
            let oldest = kept.remove(0);
            tokens -= estimate_tokens(&oldest.content);
            dropped += 1;
        }

        debug!(
            input = input_len,
            kept = kept.len(),
            dropped_for_budget = dropped,
            tokens,
            "Context trimmed"
        );
        kept
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_config(&aura_config::ContextConfig::default())
    }
}
