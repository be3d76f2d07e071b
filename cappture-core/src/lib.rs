//! # Cappture Core
//!
//! Core logic for the CapptureCanvas visual editor.
//! Compiles to WASM for the browser and runs natively for headless sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              cappture-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Canvas          │  Agent                   │
//! │  - Elements      │  - Strategies            │
//! │  - Mutations     │  - Controller            │
//! │  - Pan / zoom    │  - Workspace actions     │
//! ├─────────────────────────────────────────────┤
//! │  Persistence     │  Console                 │
//! │  - Key/value     │  - Chat transcript       │
//! │  - Auto-save     │  - Terminal log          │
//! │  - Settings      │                          │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod autosave;
pub mod console;
pub mod element;
pub mod error;
pub mod persist;
pub mod session;
pub mod settings;
pub mod store;
pub mod workspace;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use agent::{
    AgentAction, AgentController, AgentReply, AgentStatus, AgentStrategy, DelayedAgent,
    FallbackAgent, Intent, KeywordAgent, RemoteAgent,
};
pub use autosave::{AutoSavePolicy, AutoSaver, SharedCanvas};
pub use console::{ChatMessage, Console, MessageKind, TerminalLine};
pub use element::{CanvasElement, ElementId, ElementKind, Point, Size};
pub use error::{AgentError, CanvasError, CanvasResult, PersistError, WorkspaceError};
pub use persist::{FileStorage, KeyValueStorage, MemoryStorage, Persistence};
pub use session::CanvasSession;
pub use settings::Settings;
pub use store::{CanvasStore, ViewTransform};
pub use workspace::{SharedWorkspace, Workspace, WorkspaceFile};

/// Cappture core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
