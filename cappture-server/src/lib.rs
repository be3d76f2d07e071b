//! # Cappture Server Library
//!
//! Shared types and the router for the agent service.
//! This library is used by both the binary and integration tests.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod agent_process;
pub mod config;
pub mod health;
pub mod metrics;

pub use agent_process::{AgentProcessError, AgentProcessRequest, EdgeAgent};
pub use config::ServerArgs;

/// Path the editor's remote agent posts to.
pub const AGENT_PROCESS_PATH: &str = "/functions/v1/agent-process";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Keyword responder.
    pub agent: Arc<EdgeAgent>,
    /// When the server started.
    pub started_at: Instant,
}

impl AppState {
    /// State around `agent`, with the clock started now.
    #[must_use]
    pub fn new(agent: EdgeAgent) -> Self {
        Self {
            agent: Arc::new(agent),
            started_at: Instant::now(),
        }
    }
}

/// Build a CORS layer that accepts any origin with the headers the browser
/// client sends.
#[must_use]
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Agent and health routes with CORS applied.
///
/// Metrics, tracing and request ids are layered on by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(AGENT_PROCESS_PATH, post(agent_process::agent_process_handler))
        .route("/agent-process", post(agent_process::agent_process_handler))
        // Health check endpoints (Kubernetes probes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .layer(build_cors_layer())
        .with_state(state)
}
