//! Offline agent simulation.

use std::sync::PoisonError;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{AgentAction, AgentReply, AgentStrategy, Intent, HELP_TEXT};
use crate::error::AgentError;
use crate::workspace::{SharedWorkspace, Workspace};

const CHAT_REPLIES: [&str; 4] = [
    "I'm analyzing your request. This might take a moment...",
    "That's an interesting question. Let me think about the best approach.",
    "I understand what you're looking for. Here's what I suggest...",
    "Based on your requirements, I recommend the following solution.",
];

const NEW_FILE_BODY: &str = "// New file created by agent\n\nconsole.log(\"Hello from new file\");";

/// Answers prompts by keyword, proposing file actions against the current
/// workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAgent;

impl KeywordAgent {
    /// Canned replies used for prompts without a recognized keyword.
    #[must_use]
    pub fn chat_replies() -> &'static [&'static str] {
        &CHAT_REPLIES
    }

    /// Build the reply synchronously.
    #[must_use]
    pub fn reply(&self, prompt: &str, workspace: &Workspace) -> AgentReply {
        match Intent::classify(prompt) {
            Intent::CreateFile => {
                let filename = format!("new_file_{}.js", workspace.len() + 1);
                AgentReply::text(format!("I've created a new file named \"{filename}\" for you."))
                    .with_action(AgentAction::CreateFile {
                        filename,
                        filetype: Some("js".to_string()),
                        content: Some(NEW_FILE_BODY.to_string()),
                    })
            }
            Intent::DeleteFile => match workspace.files().first() {
                Some(file) => AgentReply::text(format!(
                    "I've deleted the file \"{}\" as requested.",
                    file.name
                ))
                .with_action(AgentAction::DeleteFile {
                    id: file.id.clone(),
                }),
                None => AgentReply::text("There are no files to delete."),
            },
            Intent::Help => AgentReply::text(HELP_TEXT),
            Intent::Chat => {
                let reply = CHAT_REPLIES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(CHAT_REPLIES[0]);
                AgentReply::text(reply)
            }
        }
    }
}

#[async_trait]
impl AgentStrategy for KeywordAgent {
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        let workspace = workspace.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.reply(prompt, &workspace))
    }
}

/// Wraps a strategy with a random "thinking" pause.
#[derive(Debug, Clone)]
pub struct DelayedAgent<A> {
    inner: A,
    min: Duration,
    max: Duration,
}

impl<A> DelayedAgent<A> {
    /// Pause between `min` and `max` (inclusive) before delegating to `inner`.
    /// The bounds are swapped if given in the wrong order.
    pub fn new(inner: A, min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { inner, min, max }
    }

    fn pick_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

#[async_trait]
impl<A: AgentStrategy> AgentStrategy for DelayedAgent<A> {
    async fn respond(
        &self,
        prompt: &str,
        workspace: &SharedWorkspace,
    ) -> Result<AgentReply, AgentError> {
        let delay = self.pick_delay();
        tracing::debug!(delay_ms = delay.as_millis(), "Agent thinking");
        tokio::time::sleep(delay).await;
        self.inner.respond(prompt, workspace).await
    }
}
