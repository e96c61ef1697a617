//! Chat and conversation endpoints.
//!
//! - `POST /api/chat`                    : run the agent, return the reply
//! - `POST /api/chat/stream`             : same, as server-sent events
//! - `GET  /api/conversations`           : most recently updated first
//! - `GET  /api/conversations/{id}`      : one conversation
//! - `DELETE /api/conversations/{id}`    : forget a conversation

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};

use aura_agent::AgentStreamEvent;
use aura_core::error::Error;
use aura_core::message::{Conversation, Message, Role};
use aura_core::tool::ExecutionContext;

use crate::SharedState;

/// Returned instead of an error when no completion credentials are set.
pub const FALLBACK_REPLY: &str = "### Answer\n- AI provider is not configured on the server yet.\n- Please set `GROQ_API_KEY` to enable live assistant responses.";

/// Header carrying the caller identity forwarded to tools.
pub const USER_ID_HEADER: &str = "x-user-id";

const CONVERSATION_LIST_LIMIT: usize = 50;
const STREAM_BUFFER: usize = 64;

const MISSING_INPUT: &str = "Request body must include either 'messages' (array) or 'prompt' (string)";
const LAST_NOT_USER: &str = "Last message must be a user message";
const CHAT_FAILED: &str = "Failed to process chat request";

// ── Router ────────────────────────────────────────────────────────────────

/// Build the API router. Nest this under `/api` in the main router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/stream", post(chat_stream_handler))
        .route("/conversations", get(list_conversations_handler))
        .route(
            "/conversations/{id}",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub conversation_id: String,
    pub conversation: Conversation,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            details: None,
        }),
    )
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Conversation not found".into(),
            details: None,
        }),
    )
}

/// A chat body reduced to the incoming messages and optional conversation id.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
}

impl ChatInput {
    /// Accept `{messages:[...]}`, then `{prompt}`, then `{message}`.
    ///
    /// Entries of `messages` without a known role and a string content are
    /// skipped. The last remaining entry must come from the user.
    pub fn from_body(body: &Value) -> Result<Self, &'static str> {
        let conversation_id = body
            .get("conversationId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string);

        let messages = if let Some(items) = body.get("messages").and_then(Value::as_array) {
            items.iter().filter_map(parse_message).collect()
        } else if let Some(text) = non_empty_str(body, "prompt").or_else(|| non_empty_str(body, "message")) {
            vec![Message::user(text)]
        } else {
            return Err(MISSING_INPUT);
        };

        match messages.last() {
            Some(last) if last.role == Role::User => Ok(Self {
                conversation_id,
                messages,
            }),
            _ => Err(LAST_NOT_USER),
        }
    }

    /// The newest user message.
    fn latest(&self) -> Message {
        self.messages
            .last()
            .map(|m| Message::user(m.content.clone()))
            .unwrap_or_else(|| Message::user(""))
    }
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_message(item: &Value) -> Option<Message> {
    let content = item.get("content")?.as_str()?;
    match item.get("role")?.as_str()? {
        "user" => Some(Message::user(content)),
        "assistant" => Some(Message::assistant(content)),
        "system" => Some(Message::system(content)),
        _ => None,
    }
}

fn execution_context(headers: &HeaderMap, conversation_id: Option<&str>) -> ExecutionContext {
    let mut ctx = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ExecutionContext::for_user)
        .unwrap_or_default();
    if let Some(id) = conversation_id {
        ctx = ctx.with_conversation(id);
    }
    ctx
}

/// Messages handed to the agent and the tool context for this request.
///
/// A known conversation contributes its stored history plus the new user
/// message; otherwise the incoming messages are used. Both are trimmed to
/// the context budget. The conversation id reaches tools only when it
/// names a stored conversation.
async fn prepare_run(
    state: &SharedState,
    headers: &HeaderMap,
    input: &ChatInput,
) -> (Vec<Message>, ExecutionContext) {
    let history = state.conversations.history(input.conversation_id.as_deref()).await;
    if history.is_empty() {
        (
            state.context.trim(input.messages.clone()),
            execution_context(headers, None),
        )
    } else {
        (
            state.context.build(&history, input.latest()),
            execution_context(headers, input.conversation_id.as_deref()),
        )
    }
}

/// Map the agent outcome to a reply, substituting the fallback when the
/// completion client has no credentials.
fn resolve_reply(result: Result<String, Error>) -> Result<String, Error> {
    match result {
        Err(e) if e.is_not_configured() => {
            info!(error = %e, "Completion client not configured, using fallback reply");
            Ok(FALLBACK_REPLY.to_string())
        }
        other => other,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    let input = ChatInput::from_body(&body).map_err(bad_request)?;
    info!(conversation_id = ?input.conversation_id, messages = input.messages.len(), "Chat request");

    let (messages, ctx) = prepare_run(&state, &headers, &input).await;

    let run = state.agent.run(messages, &ctx, None).await.map(|run| run.answer);
    let reply = resolve_reply(run).map_err(|e| {
        error!(error = %e, "Chat request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: CHAT_FAILED.into(),
                details: Some(e.to_string()),
            }),
        )
    })?;

    let conversation = state
        .conversations
        .record(
            input.conversation_id.as_deref(),
            input.latest(),
            Message::assistant(reply.clone()),
        )
        .await;

    Ok(Json(ChatResponse {
        reply,
        conversation_id: conversation.id.to_string(),
        conversation,
    }))
}

async fn chat_stream_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let input = ChatInput::from_body(&body).map_err(bad_request)?;
    info!(conversation_id = ?input.conversation_id, messages = input.messages.len(), "Chat stream request");

    let (messages, ctx) = prepare_run(&state, &headers, &input).await;
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::spawn(async move {
        let run = state.agent.run(messages, &ctx, Some(&tx)).await;

        let run = match run {
            Err(e) if e.is_not_configured() => {
                if tx.send(AgentStreamEvent::token(FALLBACK_REPLY)).await.is_err() {
                    return;
                }
                resolve_reply(Err(e))
            }
            other => other.map(|run| run.answer),
        };

        let terminal = match run {
            Ok(reply) => {
                let conversation = state
                    .conversations
                    .record(
                        input.conversation_id.as_deref(),
                        input.latest(),
                        Message::assistant(reply.clone()),
                    )
                    .await;
                AgentStreamEvent::Done {
                    reply,
                    conversation_id: conversation.id.to_string(),
                    conversation: Box::new(conversation),
                }
            }
            Err(Error::StreamClosed) => {
                debug!("Stream consumer disconnected, abandoning request");
                return;
            }
            Err(e) => {
                error!(error = %e, "Chat stream failed");
                AgentStreamEvent::error(CHAT_FAILED, e.to_string())
            }
        };

        if tx.send(terminal).await.is_err() {
            debug!("Stream consumer disconnected before the final event");
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.event_type();
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event_type).data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn list_conversations_handler(State(state): State<SharedState>) -> Json<Vec<Conversation>> {
    Json(state.conversations.list(CONVERSATION_LIST_LIMIT).await)
}

async fn get_conversation_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    state.conversations.get(&id).await.map(Json).ok_or_else(not_found)
}

async fn delete_conversation_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.conversations.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayState;
    use aura_agent::{AgentLoop, ContextBuilder};
    use aura_core::error::{ProviderError, ToolError};
    use aura_core::provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, StreamReceiver};
    use aura_core::tool::{Tool, ToolRegistry};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Scripted provider for gateway tests; streams word by word.
    struct MockProvider {
        texts: Vec<String>,
        calls: Mutex<usize>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl MockProvider {
        fn new(texts: &[&str]) -> Self {
            Self {
                texts: texts.iter().map(|t| t.to_string()).collect(),
                calls: Mutex::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, request: ProviderRequest) -> String {
            self.requests.lock().unwrap().push(request);
            let mut calls = self.calls.lock().unwrap();
            let text = self.texts[*calls % self.texts.len()].clone();
            *calls += 1;
            text
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(self.next(request)),
                usage: None,
                model: "mock-model".into(),
            })
        }

        async fn stream(&self, request: ProviderRequest) -> Result<StreamReceiver, ProviderError> {
            let text = self.next(request);
            let (tx, rx) = mpsc::channel(8);
            tokio::spawn(async move {
                for word in text.split_inclusive(' ') {
                    let chunk = StreamChunk {
                        content: Some(word.to_string()),
                        ..Default::default()
                    };
                    if tx.send(Ok(chunk)).await.is_err() {
                        return;
                    }
                }
                let _ = tx
                    .send(Ok(StreamChunk {
                        done: true,
                        ..Default::default()
                    }))
                    .await;
            });
            Ok(rx)
        }
    }

    struct Unconfigured;

    #[async_trait::async_trait]
    impl Provider for Unconfigured {
        fn name(&self) -> &str {
            "unconfigured"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("GROQ_API_KEY is not configured".into()))
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl Provider for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::ApiError {
                status_code: 503,
                message: "upstream down".into(),
            })
        }
    }

    /// Echoes the caller identity so tests can see what reached the tool.
    struct WhoAmI;

    #[async_trait::async_trait]
    impl Tool for WhoAmI {
        fn name(&self) -> &str {
            "whoami"
        }
        fn description(&self) -> &str {
            "caller identity"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, _arguments: Value, ctx: &ExecutionContext) -> Result<Value, ToolError> {
            Ok(json!(ctx.caller()))
        }
    }

    /// Echoes the conversation id tools were given, `"none"` when absent.
    struct ConversationRef;

    #[async_trait::async_trait]
    impl Tool for ConversationRef {
        fn name(&self) -> &str {
            "conversation_ref"
        }
        fn description(&self) -> &str {
            "conversation id"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, _arguments: Value, ctx: &ExecutionContext) -> Result<Value, ToolError> {
            Ok(json!(ctx.conversation_id.as_deref().unwrap_or("none")))
        }
    }

    fn state_with(provider: Arc<dyn Provider>) -> SharedState {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(WhoAmI));
        registry.register(Box::new(ConversationRef));
        Arc::new(GatewayState::new(
            Arc::new(AgentLoop::new(provider, "mock-model", Arc::new(registry))),
            ContextBuilder::new(3, 2000),
        ))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn sse_events(response: axum::response::Response) -> Vec<Value> {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect()
    }

    #[test]
    fn body_forms() {
        let input = ChatInput::from_body(&json!({"prompt": "  hi  "})).unwrap();
        assert_eq!(input.messages[0].content, "hi");

        let input = ChatInput::from_body(&json!({"message": "yo", "conversationId": "c1"})).unwrap();
        assert_eq!(input.conversation_id.as_deref(), Some("c1"));

        let input = ChatInput::from_body(&json!({
            "messages": [{"role": "assistant", "content": "hey"}, {"role": "bogus"}, {"role": "user", "content": "q"}]
        }))
        .unwrap();
        assert_eq!(input.messages.len(), 2);

        assert_eq!(ChatInput::from_body(&json!({})).unwrap_err(), MISSING_INPUT);
        assert_eq!(ChatInput::from_body(&json!({"prompt": "   "})).unwrap_err(), MISSING_INPUT);
        assert_eq!(
            ChatInput::from_body(&json!({"messages": [{"role": "assistant", "content": "x"}]})).unwrap_err(),
            LAST_NOT_USER
        );
        assert_eq!(ChatInput::from_body(&json!({"messages": []})).unwrap_err(), LAST_NOT_USER);
    }

    #[tokio::test]
    async fn chat_returns_reply_and_conversation() {
        let state = state_with(Arc::new(MockProvider::new(&["Hello there."])));
        let response = api_router(state.clone())
            .oneshot(post_json("/chat", json!({"prompt": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["reply"], "### Answer\n- Hello there.");
        assert_eq!(json["conversation"]["title"], "Hi");
        assert_eq!(json["conversation"]["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["conversationId"], json["conversation"]["id"]);
        assert_eq!(state.conversations.len().await, 1);
    }

    #[tokio::test]
    async fn follow_up_uses_stored_history() {
        let provider = Arc::new(MockProvider::new(&["Sure."]));
        let state = state_with(provider.clone());

        let first = body_json(
            api_router(state.clone())
                .oneshot(post_json("/chat", json!({"prompt": "one"})))
                .await
                .unwrap(),
        )
        .await;
        let id = first["conversationId"].as_str().unwrap().to_string();

        let second = body_json(
            api_router(state.clone())
                .oneshot(post_json("/chat", json!({"prompt": "two", "conversationId": id})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(second["conversationId"], id.as_str());
        assert_eq!(second["conversation"]["messages"].as_array().unwrap().len(), 4);

        // system + last three of [one, Sure., two]
        let request = provider.requests.lock().unwrap()[1].clone();
        let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(&contents[1..], ["one", "### Answer\n- Sure.", "two"]);
    }

    #[tokio::test]
    async fn caller_identity_reaches_tools() {
        let provider = Arc::new(MockProvider::new(&[r#"{"tool":"whoami","arguments":{}}"#, "Done."]));
        let state = state_with(provider.clone());

        let mut request = post_json("/chat", json!({"prompt": "who am i"}));
        request.headers_mut().insert(USER_ID_HEADER, "u-42".parse().unwrap());
        let response = api_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let second = provider.requests.lock().unwrap()[1].clone();
        assert_eq!(second.messages.last().unwrap().content, "Observation: \"u-42\"");
    }

    #[tokio::test]
    async fn tools_see_only_stored_conversation_ids() {
        let provider = Arc::new(MockProvider::new(&[
            r#"{"tool":"conversation_ref","arguments":{}}"#,
            "Noted.",
        ]));
        let state = state_with(provider.clone());

        let first = body_json(
            api_router(state.clone())
                .oneshot(post_json("/chat", json!({"prompt": "one", "conversationId": "ghost"})))
                .await
                .unwrap(),
        )
        .await;
        let id = first["conversationId"].as_str().unwrap().to_string();
        assert_ne!(id, "ghost");

        api_router(state)
            .oneshot(post_json("/chat", json!({"prompt": "two", "conversationId": id})))
            .await
            .unwrap();

        let requests = provider.requests.lock().unwrap().clone();
        assert_eq!(requests[1].messages.last().unwrap().content, "Observation: \"none\"");
        assert_eq!(
            requests[3].messages.last().unwrap().content,
            format!("Observation: \"{id}\"")
        );
    }

    #[tokio::test]
    async fn invalid_bodies_are_rejected() {
        let state = state_with(Arc::new(MockProvider::new(&["x"])));
        let response = api_router(state.clone())
            .oneshot(post_json("/chat", json!({"nothing": true})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], MISSING_INPUT);

        let response = api_router(state)
            .oneshot(post_json(
                "/chat/stream",
                json!({"messages": [{"role": "assistant", "content": "x"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unconfigured_provider_gets_fallback() {
        let state = state_with(Arc::new(Unconfigured));
        let response = api_router(state)
            .oneshot(post_json("/chat", json!({"prompt": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["reply"], FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn provider_failure_is_500_with_details() {
        let state = state_with(Arc::new(Broken));
        let response = api_router(state.clone())
            .oneshot(post_json("/chat", json!({"prompt": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], CHAT_FAILED);
        assert!(json["details"].as_str().unwrap().contains("upstream down"));
        assert!(state.conversations.is_empty().await);
    }

    #[tokio::test]
    async fn stream_emits_tokens_then_done() {
        let state = state_with(Arc::new(MockProvider::new(&["It's mild and clear."])));
        let response = api_router(state)
            .oneshot(post_json("/chat/stream", json!({"message": "weather?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let events = sse_events(response).await;
        let (last, tokens) = events.split_last().unwrap();
        assert!(!tokens.is_empty());
        assert!(tokens.iter().all(|e| e["type"] == "token"));
        let text: String = tokens.iter().map(|e| e["token"].as_str().unwrap()).collect();
        assert_eq!(text, "It's mild and clear.");

        assert_eq!(last["type"], "done");
        assert_eq!(last["reply"], "### Answer\n- It's mild and clear.");
        assert_eq!(last["conversationId"], last["conversation"]["id"]);
    }

    #[tokio::test]
    async fn long_stream_is_delivered_in_full() {
        let reply = vec!["word"; 200].join(" ");
        let state = state_with(Arc::new(MockProvider::new(&[reply.as_str()])));
        let response = api_router(state)
            .oneshot(post_json("/chat/stream", json!({"prompt": "talk"})))
            .await
            .unwrap();

        let events = sse_events(response).await;
        let streamed: String = events
            .iter()
            .filter(|e| e["type"] == "token")
            .map(|e| e["token"].as_str().unwrap())
            .collect();
        assert_eq!(streamed, reply);
        assert_eq!(events.last().unwrap()["type"], "done");
    }

    #[tokio::test]
    async fn stream_holds_tool_calls() {
        let state = state_with(Arc::new(MockProvider::new(&[
            r#"{"tool": "whoami", "arguments": {}}"#,
            "You are anonymous.",
        ])));
        let response = api_router(state)
            .oneshot(post_json("/chat/stream", json!({"prompt": "who?"})))
            .await
            .unwrap();

        let events = sse_events(response).await;
        let streamed: String = events
            .iter()
            .filter(|e| e["type"] == "token")
            .map(|e| e["token"].as_str().unwrap())
            .collect();
        assert_eq!(streamed, "You are anonymous.");
        assert!(!streamed.contains("whoami"));
        assert_eq!(events.last().unwrap()["type"], "done");
    }

    #[tokio::test]
    async fn stream_failure_ends_with_error_event() {
        let state = state_with(Arc::new(Broken));
        let response = api_router(state)
            .oneshot(post_json("/chat/stream", json!({"prompt": "Hi"})))
            .await
            .unwrap();
        let events = sse_events(response).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "error");
        assert_eq!(events[0]["error"], CHAT_FAILED);
    }

    #[tokio::test]
    async fn conversations_list_get_delete() {
        let state = state_with(Arc::new(MockProvider::new(&["ok"])));
        let created = body_json(
            api_router(state.clone())
                .oneshot(post_json("/chat", json!({"prompt": "remember me"})))
                .await
                .unwrap(),
        )
        .await;
        let id = created["conversationId"].as_str().unwrap().to_string();

        let list = body_json(
            api_router(state.clone())
                .oneshot(Request::builder().uri("/conversations").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["title"], "remember me");

        let response = api_router(state.clone())
            .oneshot(Request::builder().uri(format!("/conversations/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = api_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/conversations/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = api_router(state)
            .oneshot(Request::builder().uri(format!("/conversations/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Conversation not found");
    }
}
