//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Engine could not load a media source
    #[error("Failed to load media: {0}")]
    Load(String),

    /// Engine rejected a transport command
    #[error("Engine command '{command}' failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    /// The session task is gone
    #[error("Audio session is closed")]
    SessionClosed,

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PlaybackError {
    /// Engine command failure
    pub fn command(command: &'static str, message: impl Into<String>) -> Self {
        Self::Command {
            command,
            message: message.into(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
