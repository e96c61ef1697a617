//! Tolerant tool-call extraction from raw model text.
//!
//! Strategies run in order and the first one producing a call wins:
//!
//! 1. [`DirectJson`]: the whole text is a `{"tool":..,"arguments":..}` object
//! 2. [`FunctionWrapper`]: legacy `<function=NAME>{...}</function>` markup
//! 3. [`EmbeddedObject`]: any top-level `{...}` inside surrounding prose
//!
//! The parser only ever yields calls naming a registered tool. Anything
//! else is a final answer.

use super::scanner::{BraceScanner, first_object};
use aura_core::tool::{ToolCall, ToolRegistry};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

/// The set of tool names a call may legally name.
#[derive(Debug, Clone, Default)]
pub struct KnownTools(BTreeSet<String>);

impl KnownTools {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn from_registry(registry: &ToolRegistry) -> Self {
        Self::new(registry.names())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Sorted tool names.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

/// Turn a parsed JSON value into a call, without checking the registry.
///
/// Requires an object with a non-empty string `tool`. `arguments` falls
/// back to `{}` when missing or not an object.
pub fn normalize(value: &Value) -> Option<ToolCall> {
    let obj = value.as_object()?;
    let tool = obj.get("tool")?.as_str()?.trim();
    if tool.is_empty() {
        return None;
    }
    let arguments = match obj.get("arguments") {
        Some(Value::Object(map)) => map.clone(),
        _ => serde_json::Map::new(),
    };
    Some(ToolCall::new(tool, arguments))
}

/// Parse `text` as one JSON object and normalize it.
fn normalize_str(text: &str) -> Option<ToolCall> {
    let value: Value = serde_json::from_str(text).ok()?;
    normalize(&value)
}

/// Loose direct-JSON check: the whole trimmed text is a call object,
/// whether or not the tool exists.
///
/// The step controller uses this to route hallucinated tool names to
/// recovery instead of treating them as prose.
pub fn parse_unchecked(text: &str) -> Option<ToolCall> {
    normalize_str(text.trim())
}

/// One way of finding a tool call in model output.
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str, known: &KnownTools) -> Option<ToolCall>;
}

/// The whole text is a JSON call object.
pub struct DirectJson;

impl ParseStrategy for DirectJson {
    fn name(&self) -> &'static str {
        "direct_json"
    }

    fn parse(&self, text: &str, known: &KnownTools) -> Option<ToolCall> {
        normalize_str(text).filter(|call| known.contains(&call.tool))
    }
}

/// Legacy function-tag markup some models fall back to.
///
/// Accepts `<function=NAME>{args}</function>` and the malformed
/// `<function=NAME{args}></function>`. The first balanced object after the
/// name is the arguments, unless it is itself a full call object.
pub struct FunctionWrapper;

const FUNCTION_TAG: &str = "<function=";

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl ParseStrategy for FunctionWrapper {
    fn name(&self) -> &'static str {
        "function_wrapper"
    }

    fn parse(&self, text: &str, known: &KnownTools) -> Option<ToolCall> {
        let mut rest = text;
        while let Some(idx) = rest.find(FUNCTION_TAG) {
            let after = &rest[idx + FUNCTION_TAG.len()..];
            let name_len = after
                .char_indices()
                .find(|(_, c)| !is_name_char(*c))
                .map(|(i, _)| i)
                .unwrap_or(after.len());
            let name = &after[..name_len];
            let body = &after[name_len..];

            if !name.is_empty() {
                let arguments = match first_object(body)
                    .and_then(|obj| serde_json::from_str::<Value>(obj).ok())
                {
                    Some(value) => match normalize(&value) {
                        Some(inner) if inner.tool == name => Some(inner.arguments),
                        _ => value.as_object().cloned(),
                    },
                    None => Some(serde_json::Map::new()),
                };

                if let Some(arguments) = arguments {
                    let call = ToolCall::new(name, arguments);
                    if known.contains(&call.tool) {
                        return Some(call);
                    }
                }
            }
            rest = body;
        }
        None
    }
}

/// Any top-level object embedded in prose, first valid one wins.
pub struct EmbeddedObject;

impl ParseStrategy for EmbeddedObject {
    fn name(&self) -> &'static str {
        "embedded_object"
    }

    fn parse(&self, text: &str, known: &KnownTools) -> Option<ToolCall> {
        BraceScanner::new(text)
            .filter_map(normalize_str)
            .find(|call| known.contains(&call.tool))
    }
}

/// Ordered list of strategies with first-success semantics.
pub struct ToolCallParser {
    known: KnownTools,
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl ToolCallParser {
    /// A parser with the default strategy order.
    pub fn new(known: KnownTools) -> Self {
        Self {
            known,
            strategies: vec![
                Box::new(DirectJson),
                Box::new(FunctionWrapper),
                Box::new(EmbeddedObject),
            ],
        }
    }

    pub fn known(&self) -> &KnownTools {
        &self.known
    }

    /// Extract a call to a registered tool, or `None` for a final answer.
    pub fn parse(&self, raw: &str) -> Option<ToolCall> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        self.strategies.iter().find_map(|strategy| {
            let call = strategy.parse(text, &self.known);
            if let Some(call) = &call {
                trace!(strategy = strategy.name(), tool = %call.tool, "Tool call parsed");
            }
            call
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ToolCallParser {
        ToolCallParser::new(KnownTools::new(["get_weather", "search_web", "list_tasks"]))
    }

    fn args(v: Value) -> serde_json::Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn direct_json_call() {
        let call = parser()
            .parse(r#"  {"tool":"get_weather","arguments":{"city":"Paris"}}  "#)
            .unwrap();
        assert_eq!(call.tool, "get_weather");
        assert_eq!(call.arguments, args(serde_json::json!({"city": "Paris"})));
    }

    #[test]
    fn canonical_form_parses_back_to_same_call() {
        let call = ToolCall::new(
            "search_web",
            args(serde_json::json!({"query": "braces { } and \"quotes\"", "n": [1, 2]})),
        );
        assert_eq!(parser().parse(&call.to_protocol_json()), Some(call));
    }

    #[test]
    fn missing_or_bad_arguments_default_to_empty_object() {
        let p = parser();
        for text in [
            r#"{"tool":"list_tasks"}"#,
            r#"{"tool":"list_tasks","arguments":null}"#,
            r#"{"tool":"list_tasks","arguments":[1,2]}"#,
            r#"{"tool":"list_tasks","arguments":"x"}"#,
        ] {
            let call = p.parse(text).unwrap();
            assert!(call.arguments.is_empty(), "{text}");
        }
    }

    #[test]
    fn function_wrapper_call() {
        let call = parser()
            .parse(r#"<function=get_weather>{"city":"Paris"}</function>"#)
            .unwrap();
        assert_eq!(call.tool, "get_weather");
        assert_eq!(call.arguments, args(serde_json::json!({"city": "Paris"})));
    }

    #[test]
    fn malformed_function_wrapper_call() {
        let call = parser()
            .parse(r#"<function=search_web{"query":"rust {async}"}></function>"#)
            .unwrap();
        assert_eq!(call.tool, "search_web");
        assert_eq!(call.arguments["query"], "rust {async}");
    }

    #[test]
    fn function_wrapper_around_full_call_object() {
        let call = parser()
            .parse(r#"<function=get_weather>{"tool":"get_weather","arguments":{"city":"Oslo"}}</function>"#)
            .unwrap();
        assert_eq!(call.arguments, args(serde_json::json!({"city": "Oslo"})));
    }

    #[test]
    fn function_wrapper_without_body_has_empty_arguments() {
        let call = parser().parse("<function=list_tasks></function>").unwrap();
        assert_eq!(call.tool, "list_tasks");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn embedded_object_in_prose() {
        let text = r#"Sure, let me check. {"tool":"get_weather","arguments":{"city":"Rome"}} One moment."#;
        let call = parser().parse(text).unwrap();
        assert_eq!(call.arguments["city"], "Rome");
    }

    #[test]
    fn embedded_skips_non_calls_and_unknown_tools() {
        let text = r#"Data {"x":1} and {"tool":"hack","arguments":{}} then {"tool":"search_web","arguments":{"query":"q"}}"#;
        let call = parser().parse(text).unwrap();
        assert_eq!(call.tool, "search_web");
    }

    #[test]
    fn unknown_tool_is_not_a_call() {
        assert_eq!(parser().parse(r#"{"tool":"install_dependency","arguments":{}}"#), None);
        assert!(parse_unchecked(r#"{"tool":"install_dependency","arguments":{}}"#).is_some());
    }

    #[test]
    fn prose_and_empty_tool_names_are_final_answers() {
        let p = parser();
        assert_eq!(p.parse("It's mild and clear."), None);
        assert_eq!(p.parse(""), None);
        assert_eq!(p.parse(r#"{"tool":"","arguments":{}}"#), None);
        assert_eq!(p.parse(r#"{"tool":42}"#), None);
        assert_eq!(p.parse(r#"{"tool":"get_weather""#), None);
    }

    #[test]
    fn parse_unchecked_requires_whole_text() {
        assert!(parse_unchecked(r#"note: {"tool":"x","arguments":{}}"#).is_none());
    }
}
