//! Error types for Olive
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Olive
#[derive(Debug, Error)]
pub enum OliveError {
    /// Same channel name declared with a different payload type or direction
    #[error("Channel conflict: {0}")]
    ChannelConflict(String),

    /// Payload could not round-trip through JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Document file declares a version with no known decoder
    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(String),

    /// Document file is not a valid document of its declared version
    #[error("Decode error: {0}")]
    Decode(String),

    /// Channel transport error
    #[error("IPC error: {0}")]
    Ipc(String),

    /// Window or surface is not known to the host
    #[error("Window not found: {0}")]
    WindowNotFound(String),

    /// Preference store error
    #[error("Preferences error: {0}")]
    Preferences(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OliveError {
    /// Whether the error means the file itself is unreadable (as opposed to
    /// the file system failing).
    pub fn is_unreadable_file(&self) -> bool {
        matches!(self, OliveError::UnsupportedVersion(_) | OliveError::Decode(_) | OliveError::Json(_))
    }
}

/// Result type alias for Olive operations
pub type Result<T> = std::result::Result<T, OliveError>;
