//! Per-user tasks, notes and reminders.
//!
//! `save_task` and `list_tasks` share one process-wide [`TaskStore`], keyed
//! by the caller identity from the execution context.

use crate::required_str;
use async_trait::async_trait;
use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, Tool};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Task,
    Note,
    Reminder,
}

impl TaskKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Some(Self::Task),
            "note" => Some(Self::Note),
            "reminder" => Some(Self::Reminder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// In-memory task storage shared across requests.
#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, task: Task) -> String {
        let id = task.id.clone();
        self.tasks.write().await.push(task);
        id
    }

    /// Tasks of one user, soonest due first, undated last.
    pub async fn for_user(&self, user_id: &str) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.due_at.is_none(), t.due_at, t.created_at));
        tasks
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`, read as UTC.
fn parse_due(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub struct SaveTaskTool {
    store: Arc<TaskStore>,
}

impl SaveTaskTool {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveTaskTool {
    fn name(&self) -> &str {
        "save_task"
    }

    fn description(&self) -> &str {
        "Save a task, note or reminder for the user. due_date is UTC."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "type":     { "type": "string", "enum": ["task", "note", "reminder"] },
                "content":  { "type": "string" },
                "due_date": { "type": "string", "description": "ISO 8601 UTC time" }
            },
            "required": ["content"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let content = required_str(&arguments, "content")?;

        let kind = match arguments["type"].as_str() {
            None => TaskKind::Task,
            Some(raw) => TaskKind::parse(raw).ok_or_else(|| {
                ToolError::InvalidArguments(format!(
                    "type must be one of task, note, reminder (got '{raw}')"
                ))
            })?,
        };

        let due_at = match arguments["due_date"].as_str().filter(|s| !s.trim().is_empty()) {
            None => None,
            Some(raw) => Some(parse_due(raw).ok_or_else(|| {
                ToolError::InvalidArguments(format!("due_date '{raw}' is not a valid date"))
            })?),
        };

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: ctx.caller().to_string(),
            kind,
            content: content.to_string(),
            due_at,
            created_at: Utc::now(),
        };
        let id = self.store.insert(task).await;

        info!(tool = "save_task", user = ctx.caller(), task_id = %id, "Task saved");
        Ok(serde_json::json!({ "success": true, "savedId": id }))
    }
}

pub struct ListTasksTool {
    store: Arc<TaskStore>,
}

impl ListTasksTool {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List the user's saved tasks, notes and reminders"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let tasks = self.store.for_user(ctx.caller()).await;
        if tasks.is_empty() {
            return Ok(serde_json::json!({ "tasks": [], "message": "No saved tasks." }));
        }
        Ok(serde_json::json!({ "tasks": tasks }))
    }
}
