//! # Devtools Core - Developer Utility Tool Pipeline
//!
//! A catalog of text transforms (JSON, YAML, Base64, URL, JWT, HTML entities,
//! regex, generators, CSV, JSX) behind one request pipeline:
//! - Per-client fixed-window rate limiting behind a pluggable counter store
//! - Input sanitization and per-tool structural validation
//! - Static dispatch from tool id to transform
//! - A uniform result envelope for every outcome
//!
//! ## Architecture
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!   HTTP (api) →    │               Orchestrator                   │
//!                   │  RateLimiter → Sanitizer → InputValidator    │
//!                   │       → Dispatcher → transforms::* →         │
//!                   │       Sanitizer (output) → ToolResult        │
//!                   └──────────────────────────────────────────────┘
//!                                 ↑ ToolRegistry (read-only)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod dispatch;
pub mod orchestrator;
pub mod rate_limit;
pub mod recovery;
pub mod sanitizer;
pub mod tools;
pub mod transforms;
pub mod types;

// Internal utilities
pub mod observability;

pub use orchestrator::{Orchestrator, ToolRequest, ToolResponse, ToolResult};
pub use types::{Config, Error, Result};
