//! HTTP-backed agent and the local fallback chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AgentAction, AgentReply, AgentStrategy};
use crate::error::AgentError;
use crate::workspace::SharedWorkspace;

/// Text used when the service answers without a `response` field.
pub const DEFAULT_REMOTE_RESPONSE: &str = "I've processed your request.";

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct AgentResponseBody {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    actions: Vec<AgentAction>,
}

/// Sends prompts to an `agent-process` endpoint.
#[derive(Debug, Clone)]
pub struct RemoteAgent {
    client: reqwest::Client,
    url: String,
}

impl RemoteAgent {
    /// Agent posting to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Agent sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Endpoint this agent posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AgentStrategy for RemoteAgent {
    async fn respond(
        &self,
        prompt: &str,
        _workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AgentRequest { message: prompt })
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Status(status.as_u16()));
        }

        let body: AgentResponseBody = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;

        Ok(AgentReply {
            response: body
                .response
                .unwrap_or_else(|| DEFAULT_REMOTE_RESPONSE.to_string()),
            actions: body.actions,
        })
    }
}

/// Tries `primary` and answers with `fallback` if it fails.
#[derive(Debug, Clone)]
pub struct FallbackAgent<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackAgent<P, F> {
    /// Chain two strategies.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: AgentStrategy, F: AgentStrategy> AgentStrategy for FallbackAgent<P, F> {
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        match self.primary.respond(prompt, workspace).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::warn!(error = %e, "Primary agent failed, using fallback");
                self.fallback.respond(prompt, workspace).await
            }
        }
    }
}
