//! Tool dispatch with failure containment.
//!
//! The dispatcher never returns an error: every outcome, including a
//! missing tool, a timeout or a panicking handler, becomes a JSON value the
//! model can observe. Each invocation runs once; there is no retry.

use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, ToolCall, ToolRegistry};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke the named tool and return its result or an error object.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ExecutionContext) -> Value {
        let start = Instant::now();
        let outcome = self.run(call, ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(value) => {
                info!(tool = %call.tool, duration_ms, "Tool executed");
                value
            }
            Err(e) => {
                warn!(tool = %call.tool, duration_ms, status = e.status(), error = %e, "Tool failed");
                failure_observation(&call.tool, &e)
            }
        }
    }

    async fn run(&self, call: &ToolCall, ctx: &ExecutionContext) -> Result<Value, ToolError> {
        if !self.registry.contains(&call.tool) {
            return Err(ToolError::NotFound(call.tool.clone()));
        }

        // Own task per invocation: a panicking handler is reported, not propagated.
        let registry = Arc::clone(&self.registry);
        let owned_call = call.clone();
        let owned_ctx = ctx.clone();
        let mut handle =
            tokio::spawn(async move { registry.execute(&owned_call, &owned_ctx).await });

        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ToolError::ExecutionFailed {
                tool_name: call.tool.clone(),
                reason: if join_error.is_panic() {
                    "tool handler panicked".into()
                } else {
                    "tool handler was cancelled".into()
                },
            }),
            Err(_) => {
                handle.abort();
                Err(ToolError::Timeout {
                    tool_name: call.tool.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

/// `{error, details, status}` object for a failed invocation.
pub fn failure_observation(tool: &str, error: &ToolError) -> Value {
    json!({
        "error": format!("Tool '{tool}' failed"),
        "details": error.to_string(),
        "status": error.status(),
    })
}
