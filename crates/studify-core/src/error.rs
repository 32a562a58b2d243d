//! Core error types for studify-core.
//!
//! One umbrella `CoreError` plus per-domain enums, all via thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studify-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Durable key-value store errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Study room errors
    #[error("Room error: {0}")]
    Room(#[from] RoomError),

    /// AI assistant errors
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Durable key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write against the backing database failed
    #[error("Store operation failed: {0}")]
    QueryFailed(String),

    /// Backing database is locked
    #[error("Store is locked")]
    Locked,
}

/// Validation errors. Raised before any persistence happens.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Numeric setting outside its allowed range
    #[error("{field} must be between {min} and {max} minutes")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    /// Required text field left empty
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Study room errors.
#[derive(Error, Debug)]
pub enum RoomError {
    /// No room exists under the given code
    #[error("No room found with code {0}")]
    NotFound(String),

    /// Could not find a free room code after retrying
    #[error("Could not allocate a free room code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },

    /// The caller is not a member of the room
    #[error("Not a member of room {0}")]
    NotAMember(String),

    /// Realtime database backend error
    #[error("Realtime database error: {0}")]
    Backend(String),

    /// Room document did not deserialize
    #[error("Malformed room document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

/// AI assistant errors.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No API key configured
    #[error("Assistant API key is not configured")]
    MissingApiKey,

    /// HTTP transport failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response did not contain an assistant message
    #[error("Malformed response from assistant API")]
    MalformedResponse,

    /// Client setup failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for RoomError {
    fn from(err: reqwest::Error) -> Self {
        RoomError::Backend(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
