//! HTTP gateway for EduAssist.
//!
//! Thin marshaling over the chat [`Orchestrator`]; every chat route lives
//! under `/api/chat` (see [`api`]).
//!
//! Built on Axum.

pub mod api;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use eduassist_assistant::Orchestrator;
use eduassist_config::AppConfig;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Orchestrator,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(orchestrator: Orchestrator) -> SharedState {
        Arc::new(Self {
            orchestrator,
            start_time: chrono::Utc::now(),
        })
    }
}

/// Build the router with all gateway routes.
///
/// Layers applied:
/// - CORS (any origin when `permissive_cors`, same-origin otherwise)
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, permissive_cors: bool) -> Router {
    let cors = if permissive_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
    };

    Router::new()
        .nest("/api/chat", api::chat_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = eduassist_assistant::build(&config).await?;
    let app = build_router(GatewayState::new(orchestrator), config.gateway.permissive_cors);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
