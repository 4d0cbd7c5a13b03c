//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the sheets tool server.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing tool arguments (map to JSON-RPC INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential source missing or unreadable.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Token exchange with the OAuth endpoint failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The Sheets API answered with a non-success status.
    #[error("{status} {reason}: {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// Resource not found (map to JSON-RPC METHOD_NOT_FOUND).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal errors (map to JSON-RPC INTERNAL_ERROR).
    #[error("internal error: {0}")]
    Internal(String),

    /// HTTP transport errors (connect, timeout, body decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when the fault originated in the Sheets API itself.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i32 {
        use crate::ipc::protocol::error_codes;

        match self {
            Error::Validation(_) => error_codes::INVALID_PARAMS,
            Error::NotFound(_) => error_codes::METHOD_NOT_FOUND,
            Error::Credentials(_)
            | Error::Auth(_)
            | Error::Api { .. }
            | Error::Internal(_)
            | Error::Http(_)
            | Error::Serialization(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn api(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
