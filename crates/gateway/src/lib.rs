//! HTTP API gateway for Aura.
//!
//! Exposes a health check, the chat endpoints (plain JSON and server-sent
//! events) and conversation browsing.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod store;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use aura_agent::{AgentLoop, ContextBuilder};
use aura_config::AppConfig;
use aura_tools::TaskStore;

pub use api::{FALLBACK_REPLY, USER_ID_HEADER};
pub use store::ConversationStore;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub context: ContextBuilder,
    pub conversations: ConversationStore,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(agent: Arc<AgentLoop>, context: ContextBuilder) -> Self {
        Self {
            agent,
            context,
            conversations: ConversationStore::new(),
        }
    }

    /// Build provider, tools and agent once from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = aura_providers::build_from_config(config);
        let tools = Arc::new(aura_tools::default_registry(
            &config.tools,
            Arc::new(TaskStore::new()),
        ));
        let agent = Arc::new(AgentLoop::from_config(provider, tools, config));
        Self::new(agent, ContextBuilder::from_config(&config.context))
    }
}

/// Build the full router: `/health` plus the API nested under `/api`.
///
/// Layers applied:
/// - CORS, restricted to `cors_origin` when one is configured
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::api_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(cors_origin))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring invalid CORS origin, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!(provider = %config.provider, "No API key configured, chat will answer with the fallback reply");
    }

    let state = Arc::new(GatewayState::from_config(&config));
    let tool_count = state.agent.tools().len();
    let app = build_router(state, config.gateway.cors_origin.as_deref());

    info!(addr = %addr, provider = %config.provider, model = %config.model, tools = tool_count, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
