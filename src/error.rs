//! Error types for relnotes
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown sprint or note, invalid import)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the relnotes CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for relnotes operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Sprint not found: {0}")]
    SprintNotFound(String),

    #[error("Note not found: {note_id} in sprint {sprint_id}")]
    NoteNotFound { sprint_id: String, note_id: String },

    #[error("Component set not found: {0}")]
    ComponentSetNotFound(String),

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Not initialized: {0}")]
    NotInitialized(PathBuf),

    // Operation failures (exit code 4)
    #[error("Document node not found: {0}")]
    NodeNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Resource failed to load: {0}")]
    ResourceLoad(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::SprintNotFound(_)
            | Error::NoteNotFound { .. }
            | Error::ComponentSetNotFound(_)
            | Error::InvalidImport(_)
            | Error::NotInitialized(_) => exit_codes::USER_ERROR,

            Error::NodeNotFound(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::ResourceLoad(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the variant carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NoteNotFound { sprint_id, note_id } => Some(serde_json::json!({
                "sprint_id": sprint_id,
                "note_id": note_id,
            })),
            Error::SprintNotFound(id) => Some(serde_json::json!({ "sprint_id": id })),
            Error::LockFailed(path) | Error::NotInitialized(path) => {
                Some(serde_json::json!({ "path": path }))
            }
            _ => None,
        }
    }
}

/// Result type alias for relnotes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
