//! Provider selection from configuration.
//!
//! Builds the single completion client the agent loop is constructed with.

use crate::openai_compat::OpenAiCompatProvider;
use crate::unconfigured::UnconfiguredProvider;
use aura_core::provider::Provider;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured completion client.
///
/// Without an API key (root or `[providers.<name>]`) an
/// [`UnconfiguredProvider`] is returned, so the server still starts and
/// answers with the not-configured fallback. Local endpoints (`ollama`,
/// `vllm`, `llamacpp`) need no key.
pub fn build_from_config(config: &aura_config::AppConfig) -> Arc<dyn Provider> {
    let name = config.provider.as_str();
    let section = config.providers.get(name);

    let api_key = section
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    let base_url = section
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    match api_key {
        Some(key) => {
            info!(provider = name, base_url = %base_url, "Completion provider configured");
            Arc::new(OpenAiCompatProvider::new(name, base_url, key))
        }
        None if is_local(name) => {
            info!(provider = name, base_url = %base_url, "Local completion provider configured");
            Arc::new(OpenAiCompatProvider::new(name, base_url, "local"))
        }
        None => {
            let reason = format!("{} is not configured", key_env_var(name));
            warn!(provider = name, "{reason}; chat will answer with the fallback reply");
            Arc::new(UnconfiguredProvider::new(name, reason))
        }
    }
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Environment variable users are told to set for a provider.
fn key_env_var(provider_name: &str) -> String {
    match provider_name {
        "groq" => "GROQ_API_KEY".into(),
        "openai" => "OPENAI_API_KEY".into(),
        _ => "AURA_API_KEY".into(),
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => "https://api.groq.com/openai/v1".into(),
    }
}
