//! Chat transcript and terminal log.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Greeting posted when a console is created.
pub const WELCOME_MESSAGE: &str = "Welcome to CapptureCanvas! I can help you build, modify, and evolve your applications. What would you like to create today?";

/// Category of a chat message or terminal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed by the user.
    User,
    /// Produced by the agent.
    Agent,
    /// Produced by the application itself.
    System,
    /// Something failed.
    Error,
    /// Something succeeded.
    Success,
    /// Informational.
    Info,
    /// Worth attention.
    Warning,
}

impl MessageKind {
    /// Label shown before terminal lines of this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Agent => "AGENT",
            Self::System => "SYSTEM",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// One entry in the chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message category.
    pub kind: MessageKind,
    /// Display name of the author, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Message body.
    pub text: String,
    /// Creation time (ms since epoch).
    pub timestamp: u64,
}

/// One line in the terminal panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLine {
    /// Line category.
    pub kind: MessageKind,
    /// Line text.
    pub text: String,
    /// Creation time (ms since epoch).
    pub timestamp: u64,
}

impl std::fmt::Display for TerminalLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.text)
    }
}

/// Chat transcript plus terminal log for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Console {
    chat: Vec<ChatMessage>,
    terminal: Vec<TerminalLine>,
}

impl Console {
    /// A console opened with the welcome message.
    #[must_use]
    pub fn new() -> Self {
        let mut console = Self::default();
        console.post(MessageKind::System, None, WELCOME_MESSAGE);
        console.log(MessageKind::Info, "CapptureCanvas initialized");
        console
    }

    /// Append a chat message.
    pub fn post(&mut self, kind: MessageKind, sender: Option<&str>, text: impl Into<String>) {
        self.chat.push(ChatMessage {
            kind,
            sender: sender.map(str::to_string),
            text: text.into(),
            timestamp: current_timestamp_ms(),
        });
    }

    /// Append a terminal line.
    pub fn log(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.terminal.push(TerminalLine {
            kind,
            text: text.into(),
            timestamp: current_timestamp_ms(),
        });
    }

    /// Chat messages, oldest first.
    #[must_use]
    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Terminal lines, oldest first.
    #[must_use]
    pub fn terminal(&self) -> &[TerminalLine] {
        &self.terminal
    }

    /// Empty the chat panel.
    pub fn clear_chat(&mut self) {
        self.chat.clear();
    }

    /// Empty the terminal, leaving a note that it was cleared.
    pub fn clear_terminal(&mut self) {
        self.terminal.clear();
        self.log(MessageKind::Info, "Terminal cleared");
    }
}

/// Get the current Unix timestamp in milliseconds.
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
