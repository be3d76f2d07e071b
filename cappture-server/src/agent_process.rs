//! The `agent-process` endpoint.
//!
//! Accepts `{"message": "..."}` and answers with
//! `{"response": "...", "actions": [...]}` after a short simulated delay.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cappture_core::agent::HELP_TEXT;
use cappture_core::{AgentAction, AgentError, AgentReply, AgentStrategy, Intent, SharedWorkspace};
use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

use crate::metrics;
use crate::AppState;

const EDGE_REPLIES: [&str; 4] = [
    "I'm analyzing your request. Here's what I've found...",
    "That's an interesting question. After analyzing it, I believe the best approach is...",
    "I understand what you're looking for. Based on best practices, I suggest...",
    "After considering your requirements, here's my recommended solution...",
];

const GENERATED_FILE_BODY: &str =
    "// AI generated file\n\nconsole.log(\"Hello from AI generated file!\");";

/// Request body.
#[derive(Debug, Deserialize)]
pub struct AgentProcessRequest {
    /// The user's prompt.
    #[serde(default)]
    pub message: Option<String>,
}

/// Reasons a request is turned away.
#[derive(Debug, Error)]
pub enum AgentProcessError {
    /// No message, or an empty one.
    #[error("Message is required")]
    MissingMessage,

    /// The body was not a JSON object with a string `message`.
    #[error("Invalid request body")]
    InvalidBody(#[source] JsonRejection),
}

impl AgentProcessError {
    fn reason(&self) -> &'static str {
        match self {
            Self::MissingMessage => "missing_message",
            Self::InvalidBody(_) => "invalid_body",
        }
    }
}

impl IntoResponse for AgentProcessError {
    fn into_response(self) -> Response {
        metrics::record_validation_failure(self.reason());
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Keyword responder behind the endpoint.
///
/// Only file creation and help are recognized; everything else, delete
/// requests included, gets a canned reply.
#[derive(Debug, Clone)]
pub struct EdgeAgent {
    delay: Duration,
}

impl EdgeAgent {
    /// Responder that waits `delay` before each reply.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Simulated processing time.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Canned replies for unrecognized prompts.
    #[must_use]
    pub fn canned_replies() -> &'static [&'static str] {
        &EDGE_REPLIES
    }

    /// Produce the reply for `message`.
    pub async fn process(&self, message: &str) -> AgentReply {
        let reply = match Intent::classify(message) {
            Intent::CreateFile => {
                let filename = format!("ai_generated_{}.js", timestamp_ms());
                AgentReply::text(format!("I've created a new file named \"{filename}\" for you."))
                    .with_action(AgentAction::CreateFile {
                        filename,
                        filetype: Some("js".to_string()),
                        content: Some(GENERATED_FILE_BODY.to_string()),
                    })
            }
            Intent::Help => AgentReply::text(HELP_TEXT),
            Intent::DeleteFile | Intent::Chat => {
                let text = EDGE_REPLIES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(EDGE_REPLIES[0]);
                AgentReply::text(text)
            }
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        reply
    }
}

#[async_trait]
impl AgentStrategy for EdgeAgent {
    async fn respond(
        &self,
        prompt: &str,
        _workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        Ok(self.process(prompt).await)
    }
}

/// `POST /functions/v1/agent-process`.
#[tracing::instrument(name = "agent_process", skip(state, body))]
pub async fn agent_process_handler(
    State(state): State<AppState>,
    body: Result<Json<AgentProcessRequest>, JsonRejection>,
) -> Result<Json<AgentReply>, AgentProcessError> {
    let Json(request) = body.map_err(|e| {
        tracing::warn!("Rejected agent request: {e}");
        AgentProcessError::InvalidBody(e)
    })?;
    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or(AgentProcessError::MissingMessage)?;

    tracing::info!("Processing agent message: {message}");
    let intent = Intent::classify(&message);
    let reply = state.agent.process(&message).await;
    metrics::record_agent_request(intent.as_str());
    tracing::debug!(intent = intent.as_str(), actions = reply.actions.len(), "Agent reply ready");

    Ok(Json(reply))
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}
