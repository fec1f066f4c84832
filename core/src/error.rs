//! Error types for the SkillSync client core.
//!
//! # Design
//! Status codes that callers branch on (404, 401, 403) get dedicated variants.
//! Every other non-2xx response lands in `HttpError` with the raw status and
//! body. Storage failures are a separate enum so the session layer can decide
//! per call site whether to swallow or propagate them.

use thiserror::Error;

/// Errors returned by the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
}

/// Errors returned by request builders, response parsers and the session
/// layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401. The stored session has already been purged
    /// by the time a caller sees this.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned 403.
    #[error("forbidden")]
    Forbidden,

    /// The server returned a non-2xx status without a dedicated variant.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be delivered (DNS, connect, TLS, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The login response lacked fields required to build a session.
    #[error("invalid login response: missing {}", missing.join(", "))]
    InvalidLoginResponse { missing: Vec<&'static str> },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Whether an idempotent read may be replayed after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Transport(_) => true,
            ApiError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short message suitable for an error banner with a retry action.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Invalid credentials.",
            ApiError::Forbidden => "You do not have permission for this action.",
            ApiError::NotFound => "The requested item no longer exists.",
            ApiError::Timeout | ApiError::Transport(_) => {
                "Could not reach the server. Check your connection and try again."
            }
            ApiError::InvalidLoginResponse { .. } => {
                "The server returned an incomplete response. Try again."
            }
            _ => "Something went wrong. Try again.",
        }
    }
}
