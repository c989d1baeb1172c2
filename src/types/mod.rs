//! Core types for the tool pipeline.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (RequestId, ClientKey)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, limits and rate limiting

mod config;
mod errors;
mod ids;

pub use config::{
    Config, InputLimits, ObservabilityConfig, RateLimitConfig, ServerConfig, ENV_LISTEN_ADDR,
    ENV_RATE_LIMIT_MAX, ENV_RATE_LIMIT_WINDOW,
};
pub use errors::{Error, ErrorCode, Result};
pub use ids::{ClientKey, RequestId};
