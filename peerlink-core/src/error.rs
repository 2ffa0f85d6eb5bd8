//! Error types for peerlink-core

use thiserror::Error;

/// Errors raised while interpreting or relaying signaling traffic
///
/// None of these escape a single connection: the handler maps each variant
/// to a close code, a dropped frame or a disconnect.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message is not a JSON object")]
    NotAnObject,

    #[error("Message has no type field")]
    MissingType,

    #[error("Expected join as first message, got {0}")]
    NotJoin(String),

    #[error("Connection closed before join")]
    ClosedBeforeJoin,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SignalError {
    /// Whether the error breaks the handshake and must close the connection
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(self, SignalError::Transport(_) | SignalError::ClosedBeforeJoin)
    }
}
