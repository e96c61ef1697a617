//! The system message that conditions the model on the tool-call protocol.

use aura_core::tool::ToolRegistry;
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};

/// The user's local timezone, as a label plus a fixed offset from UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalZone {
    pub label: String,
    pub utc_offset_minutes: i32,
}

impl LocalZone {
    pub fn new(label: impl Into<String>, utc_offset_minutes: i32) -> Self {
        Self {
            label: label.into(),
            utc_offset_minutes,
        }
    }

    pub fn from_config(config: &aura_config::AgentConfig) -> Self {
        Self::new(config.timezone_label.clone(), config.utc_offset_minutes)
    }

    /// `UTC+5:30`, `UTC-8:00`, `UTC+0:00`.
    pub fn offset_label(&self) -> String {
        let sign = if self.utc_offset_minutes < 0 { '-' } else { '+' };
        let minutes = self.utc_offset_minutes.unsigned_abs();
        format!("UTC{sign}{}:{:02}", minutes / 60, minutes % 60)
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }

    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset())
    }
}

impl Default for LocalZone {
    fn default() -> Self {
        Self::new("UTC", 0)
    }
}

/// Build the first message of every request.
pub fn build_system_prompt(
    assistant_name: &str,
    tools: &ToolRegistry,
    now: DateTime<Utc>,
    zone: &LocalZone,
) -> String {
    let definitions =
        serde_json::to_string(&tools.definitions()).unwrap_or_else(|_| "[]".to_string());
    let label = &zone.label;
    let offset = zone.offset_label();
    let utc_now = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let local_now = zone.local_time(now).to_rfc3339_opts(SecondsFormat::Secs, false);

    format!(
        r#"You are {assistant_name}, a reliable assistant.

TIMEZONE: The user is in {label} ({offset}).
Convert times the user gives in {label} to UTC before saving tasks.

Current UTC time: {utc_now}
Current {label} time: {local_now}

FORMAT RULES:
- Use natural Markdown.
- Use bullet points for lists.
- When comparing 2 or more entities across attributes, use a Markdown table.
- Do NOT output an "Answer" heading.

TOOL RULES:
1. If a tool is needed, respond with ONLY JSON {{"tool":"tool_name","arguments":{{...}}}}
2. No markdown or other text while calling tools.
3. Use only tools listed in "Available tools".
4. After an Observation, either call another tool or answer the user.

Available tools: {definitions}"#
    )
}
