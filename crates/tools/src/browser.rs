//! Headless-browser page reader.
//!
//! Every invocation launches its own browser and closes it before
//! returning, on success and failure alike. Nothing is pooled.

use crate::required_str;
use async_trait::async_trait;
use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, Tool};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

const NAME: &str = "browse_page";
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_CONTENT_CHARS: usize = 3000;

pub struct BrowsePageTool;

impl BrowsePageTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowsePageTool {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(reason: impl Into<String>) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: NAME.into(),
        reason: reason.into(),
    }
}

/// Collapse whitespace runs and cap the length in characters.
fn clean_content(raw: &str, collapse: bool) -> String {
    let text = if collapse {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        raw.to_string()
    };
    text.chars().take(MAX_CONTENT_CHARS).collect()
}

/// A launched browser plus the task driving its event handler.
struct Session {
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
}

impl Session {
    async fn launch() -> Result<Self, ToolError> {
        let config = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .build()
            .map_err(|e| ToolError::NotConfigured {
                tool_name: NAME.into(),
                reason: format!("{e}. Is Chrome/Chromium installed?"),
            })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| failed(format!("Failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        Ok(Self { browser, handler })
    }

    async fn read(&self, url: &str, extract_text: bool) -> Result<String, ToolError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| failed(format!("Failed to open page: {e}")))?;

        tokio::time::timeout(NAVIGATION_TIMEOUT, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await
        .map_err(|_| ToolError::Timeout {
            tool_name: NAME.into(),
            timeout_secs: NAVIGATION_TIMEOUT.as_secs(),
        })?
        .map_err(|e| failed(format!("Failed to navigate to {url}: {e}")))?;

        if extract_text {
            let text: String = page
                .evaluate("document.body ? document.body.innerText : ''")
                .await
                .map_err(|e| failed(format!("Failed to read page text: {e}")))?
                .into_value()
                .unwrap_or_default();
            Ok(clean_content(&text, true))
        } else {
            let html = page
                .content()
                .await
                .map_err(|e| failed(format!("Failed to read page HTML: {e}")))?;
            Ok(clean_content(&html, false))
        }
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(tool = NAME, error = %e, "Browser did not close cleanly");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}

#[async_trait]
impl Tool for BrowsePageTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Open a web page in a headless browser and return its text (or HTML)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "extract_text": { "type": "boolean", "default": true }
            },
            "required": ["url"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let url = required_str(&arguments, "url")?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "url must start with http:// or https://".into(),
            ));
        }
        let extract_text = arguments["extract_text"].as_bool().unwrap_or(true);

        debug!(tool = NAME, url, "Launching browser");
        let session = Session::launch().await?;
        let result = session.read(url, extract_text).await;
        session.close().await;

        let content = result?;
        Ok(serde_json::json!({ "url": url, "content": content }))
    }
}
