//! # Aura Core
//!
//! Domain types, traits, and error definitions for the Aura assistant.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the provider, tool, agent, and gateway crates implement against.
//!
//! ## Design Philosophy
//!
//! The completion client and every tool are traits here. Implementations
//! live in their respective crates, so the agent loop can be driven by a
//! scripted provider in tests and by a real HTTP client in production.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, OBSERVATION_PREFIX, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, StreamReceiver, Usage};
pub use tool::{ExecutionContext, Tool, ToolCall, ToolDefinition, ToolRegistry};
