//! Error types for canvas, persistence and workspace operations.

use thiserror::Error;

use crate::element::ElementId;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas mutations.
///
/// Every variant is non-fatal: the store is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    /// The mutation referenced an element that is not in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// A resize was requested with a non-positive or non-finite dimension.
    #[error("Invalid size {width}x{height}: width and height must be positive")]
    InvalidSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// An add or move would leave an element at a non-finite position.
    #[error("Invalid position ({x}, {y}): coordinates must be finite")]
    NonFinitePosition {
        /// Resulting x coordinate.
        x: f64,
        /// Resulting y coordinate.
        y: f64,
    },
}

/// Errors raised while reading or writing the string-keyed store.
///
/// In-memory state is never touched when one of these is returned, so the
/// store stays dirty and a later save can retry.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The backing storage rejected the read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of the element list failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the mock file workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    /// No file with the given id exists.
    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Errors produced while obtaining an agent reply.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The request could not be sent or the connection failed.
    #[error("Agent request failed: {0}")]
    Request(String),

    /// The agent service answered with a non-success status.
    #[error("Agent service returned status {0}")]
    Status(u16),

    /// The reply body could not be decoded.
    #[error("Invalid agent response: {0}")]
    InvalidResponse(String),
}
