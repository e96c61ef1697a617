//! Corrective observations for calls naming an unregistered tool.

use serde_json::{Value, json};

/// Observation payload telling the model which tools actually exist.
pub fn unknown_tool_observation(tool: &str, available: &[&str]) -> Value {
    json!({
        "error": format!("Unknown tool: {tool}"),
        "available_tools": available,
        "hint": "Call one of the available tools using {\"tool\":\"tool_name\",\"arguments\":{...}}, or answer the user directly in plain text.",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_unknown_tool_and_valid_set() {
        let obs = unknown_tool_observation("install_dependency", &["get_weather", "search_web"]);
        assert_eq!(obs["error"], "Unknown tool: install_dependency");
        assert_eq!(obs["available_tools"], json!(["get_weather", "search_web"]));
        assert!(obs["hint"].as_str().unwrap().contains("plain text"));
    }
}
