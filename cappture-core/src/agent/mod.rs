//! # Agent
//!
//! The assistant behind the chat panel, modeled as a pluggable strategy.
//!
//! ```text
//! prompt ──▶ AgentStrategy::respond ──▶ AgentReply { response, actions }
//!                                              │
//!            AgentController ◀─────────────────┘
//!              ├─ applies actions to the Workspace
//!              └─ appends the reply to the Console
//! ```
//!
//! [`KeywordAgent`] is the offline simulation; [`RemoteAgent`] talks to the
//! `agent-process` service and [`FallbackAgent`] chains the two.

mod controller;
mod keyword;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::workspace::SharedWorkspace;

pub use controller::{AgentController, AgentStatus, AGENT_NOT_ACTIVE};
pub use keyword::{DelayedAgent, KeywordAgent};
pub use remote::{FallbackAgent, RemoteAgent};

/// Reply shown when the user asks for help.
pub const HELP_TEXT: &str = "I can help you with:\n- Creating new files\n- Managing your workspace\n- Answering questions about development\n- Providing code examples\n\nJust let me know what you need!";

/// A side effect the agent wants applied to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentAction {
    /// Create a file in the workspace.
    #[serde(rename = "createFile")]
    CreateFile {
        /// Name of the new file.
        #[serde(alias = "fileName")]
        filename: String,
        /// Language tag; `js` when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filetype: Option<String>,
        /// File body; empty when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// Delete a file from the workspace.
    #[serde(rename = "deleteFile")]
    DeleteFile {
        /// Id of the file to delete.
        id: String,
    },
    /// An action type this client does not understand; ignored.
    #[serde(other)]
    Unknown,
}

/// Text plus workspace actions returned for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    /// Text shown in the chat panel.
    pub response: String,
    /// Actions to apply, in order.
    #[serde(default)]
    pub actions: Vec<AgentAction>,
}

impl AgentReply {
    /// A reply with text only.
    #[must_use]
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            actions: Vec::new(),
        }
    }

    /// Append an action.
    #[must_use]
    pub fn with_action(mut self, action: AgentAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// What a prompt is asking for, by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// "create file" or "new file".
    CreateFile,
    /// "delete file".
    DeleteFile,
    /// "help".
    Help,
    /// Anything else.
    Chat,
}

impl Intent {
    /// Classify a prompt. Matching is case-insensitive and the first rule
    /// that matches wins.
    #[must_use]
    pub fn classify(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        if prompt.contains("create file") || prompt.contains("new file") {
            Self::CreateFile
        } else if prompt.contains("delete file") {
            Self::DeleteFile
        } else if prompt.contains("help") {
            Self::Help
        } else {
            Self::Chat
        }
    }

    /// Short name used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateFile => "create_file",
            Self::DeleteFile => "delete_file",
            Self::Help => "help",
            Self::Chat => "chat",
        }
    }
}

/// Produces a reply for a prompt.
///
/// Implementations may take arbitrarily long; callers must not assume a
/// bounded latency.
#[async_trait]
pub trait AgentStrategy: Send + Sync {
    /// Respond to `prompt`.
    ///
    /// `workspace` is live: read it when the reply is decided, not before a
    /// pause, and never hold its lock across an `.await`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if no reply could be produced.
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError>;
}

#[async_trait]
impl<T: AgentStrategy + ?Sized> AgentStrategy for Arc<T> {
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        (**self).respond(prompt, workspace).await
    }
}

#[async_trait]
impl<T: AgentStrategy + ?Sized> AgentStrategy for Box<T> {
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        (**self).respond(prompt, workspace).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_keywords() {
        assert_eq!(Intent::classify("Please CREATE FILE now"), Intent::CreateFile);
        assert_eq!(Intent::classify("make a new file"), Intent::CreateFile);
        assert_eq!(Intent::classify("delete file please"), Intent::DeleteFile);
        assert_eq!(Intent::classify("Help!"), Intent::Help);
        assert_eq!(Intent::classify("what is rust"), Intent::Chat);
    }

    #[test]
    fn create_rule_wins_over_help() {
        assert_eq!(Intent::classify("help me create file"), Intent::CreateFile);
    }

    #[test]
    fn action_accepts_both_filename_spellings() {
        let a: AgentAction =
            serde_json::from_str(r#"{"type":"createFile","filename":"a.js"}"#).expect("parse");
        let b: AgentAction =
            serde_json::from_str(r#"{"type":"createFile","fileName":"a.js"}"#).expect("parse");
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_action_types_parse_as_unknown() {
        let reply: AgentReply = serde_json::from_str(
            r#"{"response":"ok","actions":[{"type":"launchRocket","target":"moon"},{"type":"createFile","filename":"x.js","filetype":"js","content":"1"}]}"#,
        )
        .expect("parse");

        assert_eq!(reply.actions.len(), 2);
        assert_eq!(reply.actions[0], AgentAction::Unknown);
        assert!(matches!(reply.actions[1], AgentAction::CreateFile { .. }));
    }

    #[test]
    fn reply_without_actions_parses() {
        let reply: AgentReply = serde_json::from_str(r#"{"response":"hi"}"#).expect("parse");
        assert_eq!(reply, AgentReply::text("hi"));
    }

    #[test]
    fn create_action_serializes_wire_shape() {
        let action = AgentAction::CreateFile {
            filename: "a.js".into(),
            filetype: Some("js".into()),
            content: None,
        };
        let value = serde_json::to_value(&action).expect("serialize");
        assert_eq!(value["type"], "createFile");
        assert_eq!(value["filename"], "a.js");
        assert!(value.get("content").is_none());
    }
}
