//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the assistant the ability to act in the world:
//! search the web, look up the weather, send email, save tasks.
//! Only their call/response contract matters to the agent loop.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A structured request, emitted by the model instead of prose, naming a
/// registered tool and its arguments.
///
/// Serializes to the canonical protocol form
/// `{"tool":"<name>","arguments":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub tool: String,

    /// Arguments, always a JSON object after normalization
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, arguments: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }

    /// The canonical single-line JSON form written back into history.
    ///
    /// `tool` is always written first, whatever the map ordering of the
    /// underlying JSON implementation.
    pub fn to_protocol_json(&self) -> String {
        format!(
            r#"{{"tool":{},"arguments":{}}}"#,
            serde_json::Value::String(self.tool.clone()),
            serde_json::Value::Object(self.arguments.clone())
        )
    }
}

/// Request-scoped data forwarded to every tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Identity of the caller, when the transport knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Conversation the request belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ExecutionContext {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// The caller identity, or `"anonymous"` when unknown.
    pub fn caller(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

/// A tool definition listed in the system prompt so the model knows what
/// it may call. The parameter schema is descriptive only; it is never
/// enforced by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Handlers return a JSON-serializable result. They return `Err` only for
/// genuinely unexpected failures; an empty or no-results case is a normal
/// result with an explanatory message.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_weather").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> std::result::Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolDefinition for the system prompt.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Built once at startup and shared read-only across requests. Names are
/// kept ordered so prompts and corrective observations are deterministic.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool definitions (for the system prompt).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &ExecutionContext,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .get(&call.tool)
            .ok_or_else(|| ToolError::NotFound(call.tool.clone()))?;
        tool.execute(serde_json::Value::Object(call.arguments.clone()), ctx)
            .await
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
            ctx: &ExecutionContext,
        ) -> std::result::Result<serde_json::Value, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("");
            Ok(serde_json::json!(format!("{}: {}", ctx.caller(), text)))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.contains("echo"));
        assert!(!registry.contains("nonexistent"));
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn registry_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
    }

    #[test]
    fn tool_call_protocol_json_is_canonical() {
        let mut args = serde_json::Map::new();
        args.insert("city".into(), serde_json::json!("Paris"));
        let call = ToolCall::new("get_weather", args);
        assert_eq!(
            call.to_protocol_json(),
            r#"{"tool":"get_weather","arguments":{"city":"Paris"}}"#
        );

        let back: ToolCall = serde_json::from_str(&call.to_protocol_json()).unwrap();
        assert_eq!(back, call);
    }

    #[tokio::test]
    async fn registry_execute_tool_with_context() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let mut args = serde_json::Map::new();
        args.insert("text".into(), serde_json::json!("hello world"));
        let call = ToolCall::new("echo", args);
        let result = registry
            .execute(&call, &ExecutionContext::for_user("u-1"))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!("u-1: hello world"));
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new("nonexistent", serde_json::Map::new());
        let err = registry
            .execute(&call, &ExecutionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}
