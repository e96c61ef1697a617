//! Outbound email through an HTTP mail API.
//!
//! Sends `POST {base_url}/emails` with a bearer key. Delivery is
//! fire-and-observe: the call is made once and its outcome reported back.

use crate::{http_client, request_error, required_str};
use async_trait::async_trait;
use aura_config::EmailConfig;
use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, Tool};
use std::time::Duration;
use tracing::info;

const NAME: &str = "send_email";

pub struct SendEmailTool {
    config: EmailConfig,
    timeout: Duration,
    client: reqwest::Client,
}

impl SendEmailTool {
    pub fn new(config: EmailConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            client: http_client(timeout),
        }
    }

    fn not_configured(reason: &str) -> ToolError {
        ToolError::NotConfigured {
            tool_name: NAME.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Send an email to someone"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "to":      { "type": "string" },
                "subject": { "type": "string" },
                "body":    { "type": "string" }
            },
            "required": ["to", "subject", "body"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let to = required_str(&arguments, "to")?;
        let subject = required_str(&arguments, "subject")?;
        let body = required_str(&arguments, "body")?;

        if !to.contains('@') {
            return Err(ToolError::InvalidArguments(format!(
                "'{to}' is not an email address"
            )));
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Self::not_configured("EMAIL_API_KEY is not set"))?;
        let from = self
            .config
            .from
            .as_deref()
            .ok_or_else(|| Self::not_configured("EMAIL_FROM is not set"))?;

        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "from": from,
                "to": [to],
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| request_error(NAME, self.timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: format!("mail API returned {status}: {detail}"),
            });
        }

        info!(tool = NAME, to, user = ctx.caller(), "Email sent");
        Ok(serde_json::json!({
            "success": true,
            "message": format!("Email sent to {to}"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> EmailConfig {
        EmailConfig {
            api_key: Some("mail-key".into()),
            base_url: server.uri(),
            from: Some("aura@example.com".into()),
        }
    }

    fn args() -> serde_json::Value {
        serde_json::json!({"to": "sam@example.com", "subject": "Hi", "body": "See you at 5"})
    }

    #[tokio::test]
    async fn sends_once_and_reports_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("Authorization", "Bearer mail-key"))
            .and(body_partial_json(serde_json::json!({
                "from": "aura@example.com",
                "to": ["sam@example.com"],
                "subject": "Hi"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "e1"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = SendEmailTool::new(config(&server), Duration::from_secs(5));
        let result = tool.execute(args(), &ExecutionContext::for_user("u1")).await.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "Email sent to sam@example.com");
    }

    #[tokio::test]
    async fn missing_sender_is_not_configured() {
        let server = MockServer::start().await;
        let mut cfg = config(&server);
        cfg.from = None;
        let tool = SendEmailTool::new(cfg, Duration::from_secs(5));
        let err = tool.execute(args(), &ExecutionContext::default()).await.unwrap_err();
        assert_eq!(err.status(), "not_configured");
    }

    #[tokio::test]
    async fn bad_address_is_invalid() {
        let server = MockServer::start().await;
        let tool = SendEmailTool::new(config(&server), Duration::from_secs(5));
        let err = tool
            .execute(
                serde_json::json!({"to": "sam", "subject": "Hi", "body": "x"}),
                &ExecutionContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn rejected_send_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;
        let tool = SendEmailTool::new(config(&server), Duration::from_secs(5));
        let err = tool.execute(args(), &ExecutionContext::default()).await.unwrap_err();
        assert!(err.to_string().contains("invalid from"));
    }
}
