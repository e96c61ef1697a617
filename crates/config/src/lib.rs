//! Configuration loading, validation, and management for Aura.
//!
//! Loads configuration from `~/.aura/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.aura/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion provider (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion provider ("groq", "openai", or any `[providers.<name>]` entry)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Zero keeps tool selection deterministic.
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens per completion, provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("context", &self.context)
            .field("gateway", &self.gateway)
            .field("tools", &self.tools)
            .field("providers", &self.providers)
            .finish()
    }
}

/// Step controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on model round trips per request
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Name the assistant introduces itself with
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Label of the user's local timezone, shown in the system prompt
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,

    /// Offset of the user's local timezone from UTC, in minutes
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

fn default_max_steps() -> usize {
    6
}
fn default_assistant_name() -> String {
    "Aura".into()
}
fn default_timezone_label() -> String {
    "IST".into()
}
fn default_utc_offset_minutes() -> i32 {
    330
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            assistant_name: default_assistant_name(),
            timezone_label: default_timezone_label(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

/// History trimming applied before each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Most recent messages kept
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Approximate token ceiling for the kept messages
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
}

fn default_max_messages() -> usize {
    3
}
fn default_token_budget() -> usize {
    2000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            token_budget: default_token_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allowed browser origin. Any origin when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origin: None,
        }
    }
}

/// Built-in tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Per-invocation timeout enforced by the dispatcher
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub email: EmailConfig,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            search: SearchConfig::default(),
            weather: WeatherConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub base_url: String,

    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_search_url() -> String {
    "https://api.tavily.com".into()
}
fn default_max_results() -> u32 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_url(),
            max_results: default_max_results(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org".into()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_url(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// HTTP mail API settings (`POST {base_url}/emails` with a bearer key).
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_email_url")]
    pub base_url: String,

    /// Sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

fn default_email_url() -> String {
    "https://api.resend.com".into()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_email_url(),
            from: None,
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.aura/config.toml).
    ///
    /// Environment variables override the file:
    /// - `AURA_API_KEY`, then `GROQ_API_KEY`, then `OPENAI_API_KEY`
    /// - `AURA_PROVIDER`, `AURA_MODEL`, `AURA_PORT`
    /// - `TAVILY_API_KEY`, `WEATHER_API_KEY`, `EMAIL_API_KEY`, `EMAIL_FROM`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored, so an exported-but-blank variable does not
    /// wipe a key set in the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("AURA_API_KEY")
            .or_else(|| get("GROQ_API_KEY"))
            .or_else(|| get("OPENAI_API_KEY"))
        {
            self.api_key = Some(key);
        }
        if let Some(provider) = get("AURA_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = get("AURA_MODEL") {
            self.model = model;
        }
        if let Some(port) = get("AURA_PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("AURA_PORT is not a valid port: {port}"))
            })?;
        }
        if let Some(key) = get("TAVILY_API_KEY") {
            self.tools.search.api_key = Some(key);
        }
        if let Some(key) = get("WEATHER_API_KEY") {
            self.tools.weather.api_key = Some(key);
        }
        if let Some(key) = get("EMAIL_API_KEY") {
            self.tools.email.api_key = Some(key);
        }
        if let Some(from) = get("EMAIL_FROM") {
            self.tools.email.from = Some(from);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".aura")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }
        if self.context.max_messages == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_messages must be at least 1".into(),
            ));
        }
        if self.context.token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "context.token_budget must be at least 1".into(),
            ));
        }
        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check if a completion API key is available for the selected provider.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: None,
            agent: AgentConfig::default(),
            context: ContextConfig::default(),
            gateway: GatewayConfig::default(),
            tools: ToolsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
