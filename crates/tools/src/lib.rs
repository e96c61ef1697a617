//! Built-in tool implementations for Aura.
//!
//! Tools give the assistant the ability to act in the world: search the
//! web, look up the weather, send email, and keep a per-user task list.
//!
//! With the `browser` feature, a headless-browser page reader is also
//! registered.

pub mod email;
pub mod search_web;
pub mod tasks;
pub mod weather;

#[cfg(feature = "browser")]
pub mod browser;

use aura_config::ToolsConfig;
use aura_core::error::ToolError;
use aura_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

pub use tasks::{Task, TaskKind, TaskStore};

/// Create the default tool registry with all built-in tools.
///
/// `tasks` is shared with the caller so saved tasks outlive a single
/// request.
pub fn default_registry(config: &ToolsConfig, tasks: Arc<TaskStore>) -> ToolRegistry {
    let timeout = Duration::from_secs(config.timeout_secs);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(search_web::SearchWebTool::new(
        config.search.clone(),
        timeout,
    )));
    registry.register(Box::new(weather::GetWeatherTool::new(
        config.weather.clone(),
        timeout,
    )));
    registry.register(Box::new(email::SendEmailTool::new(
        config.email.clone(),
        timeout,
    )));
    registry.register(Box::new(tasks::SaveTaskTool::new(tasks.clone())));
    registry.register(Box::new(tasks::ListTasksTool::new(tasks)));

    #[cfg(feature = "browser")]
    registry.register(Box::new(browser::BrowsePageTool::new()));

    registry
}

/// HTTP client with a per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a transport error onto the tool error taxonomy.
pub(crate) fn request_error(tool_name: &str, timeout: Duration, e: reqwest::Error) -> ToolError {
    if e.is_timeout() {
        ToolError::Timeout {
            tool_name: tool_name.into(),
            timeout_secs: timeout.as_secs(),
        }
    } else {
        ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: e.to_string(),
        }
    }
}

/// Read a required, non-empty string argument.
pub(crate) fn required_str<'a>(
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_builtin_tools() {
        let registry = default_registry(&ToolsConfig::default(), Arc::new(TaskStore::new()));
        for name in ["get_weather", "list_tasks", "save_task", "search_web", "send_email"] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn required_str_rejects_blank() {
        let args = serde_json::json!({"city": "  ", "n": 3});
        assert!(required_str(&args, "city").is_err());
        assert!(required_str(&args, "n").is_err());
        assert!(required_str(&args, "missing").is_err());

        let args = serde_json::json!({"city": " Paris "});
        assert_eq!(required_str(&args, "city").unwrap(), "Paris");
    }
}
