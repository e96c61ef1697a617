//! Conversation-context trimming.
//!
//! History is cut to the most recent messages, then to a token budget,
//! before every request reaches the step controller.

pub mod builder;
pub mod token;

pub use builder::ContextBuilder;
pub use token::{estimate_messages_tokens, estimate_tokens};
