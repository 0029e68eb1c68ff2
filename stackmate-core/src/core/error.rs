//! Error types for the StackMate core library.

use thiserror::Error;

/// All errors that can occur within the StackMate core library.
#[derive(Debug, Error)]
pub enum StackmateError {
    /// Note content was empty or whitespace-only when saving or editing.
    #[error("Cannot save an empty note")]
    EmptyContent,

    /// A note ID was requested that does not exist in the store.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// The durable store could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// The opened file is not a valid StackMate note store.
    #[error("Invalid note store: {0}")]
    InvalidStore(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be serialized to or deserialized from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A call to a companion service failed or returned an error payload.
    #[error("Service error: {0}")]
    Service(String),
}

/// Convenience alias that pins the error type to [`StackmateError`].
pub type Result<T> = std::result::Result<T, StackmateError>;

impl StackmateError {
    /// Returns a short, human-readable message suitable for a transient UI warning.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyContent => "Cannot save an empty note".to_string(),
            Self::NoteNotFound(_) => "Note no longer exists".to_string(),
            Self::StorageUnavailable(e) => format!("Failed to save: {e}"),
            Self::InvalidStore(_) => "Could not open the notes file".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::Service(msg) => msg.clone(),
        }
    }

    /// Whether the error leaves the caller free to retry after correcting input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyContent | Self::NoteNotFound(_))
    }
}
