//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Domain
//! failures (invalid JSON, malformed JWT, bad regex) are NOT errors: they are
//! reported inside the transform payload. Everything here is an
//! infrastructure or unexpected failure.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tool pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Request or input shape violations (map to 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown tool or category (map to 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Client exceeded its request quota (map to 429).
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Internal errors (map to 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file errors.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable failure classes surfaced at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RateLimited,
    InvalidRequest,
    ToolNotFound,
    Internal,
}

impl ErrorCode {
    /// HTTP status for this failure class.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ToolNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::ToolNotFound => "tool_not_found",
            ErrorCode::Internal => "internal",
        }
    }
}

impl Error {
    /// Classify into the boundary failure taxonomy.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::InvalidRequest,
            Error::NotFound(_) => ErrorCode::ToolNotFound,
            Error::RateLimited(_) => ErrorCode::RateLimited,
            Error::Internal(_) | Error::Serialization(_) | Error::Config(_) | Error::Io(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Internal details are replaced with a generic message; they are logged
    /// where the error is caught instead.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) | Error::RateLimited(msg) => msg.clone(),
            _ => "Internal error while processing the request".to_string(),
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
