//! Error types for the MCP server runtime.

use thiserror::Error;

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

/// Error type for the server loop and transport.
///
/// Tool failures never appear here: they are folded into the tool result
/// by the dispatcher. These errors end the serving loop.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to read from or write to the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging could not be initialised.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl McpError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a logging error.
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}
