//! HTTP boundary: discovery endpoints and tool invocation.

pub mod client;
pub mod handlers;
pub mod routes;

pub use client::ClientIdentity;
pub use handlers::{ApiError, AppState};
pub use routes::create_router;
