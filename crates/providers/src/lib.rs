//! Completion client implementations for Aura.
//!
//! All providers implement the `aura_core::Provider` trait.
//! [`build_from_config`] selects the one the agent loop is built with.

pub mod openai_compat;
pub mod router;
pub mod unconfigured;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
pub use unconfigured::UnconfiguredProvider;
