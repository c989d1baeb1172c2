//! Configuration structures.
//!
//! Configuration is loaded from an optional YAML file, then overridden by
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::errors::{Error, Result};

/// Environment override for `server.listen_addr`.
pub const ENV_LISTEN_ADDR: &str = "DEVTOOLS_LISTEN_ADDR";
/// Environment override for `rate_limit.max_requests`.
pub const ENV_RATE_LIMIT_MAX: &str = "DEVTOOLS_RATE_LIMIT_MAX";
/// Environment override for `rate_limit.window` (humantime, e.g. `15m`).
pub const ENV_RATE_LIMIT_WINDOW: &str = "DEVTOOLS_RATE_LIMIT_WINDOW";

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Input and generator bounds.
    #[serde(default)]
    pub limits: InputLimits,

    /// Per-client request quota.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load configuration from an optional YAML file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&raw)?
            }
            None => Config::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (injected so tests don't touch the process env).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.server.listen_addr = addr;
        }
        if let Some(max) = lookup(ENV_RATE_LIMIT_MAX) {
            self.rate_limit.max_requests = max.trim().parse().map_err(|_| {
                Error::validation(format!("{ENV_RATE_LIMIT_MAX} must be a positive integer, got '{max}'"))
            })?;
        }
        if let Some(window) = lookup(ENV_RATE_LIMIT_WINDOW) {
            self.rate_limit.window = humantime_serde::re::humantime::parse_duration(window.trim())
                .map_err(|e| {
                    Error::validation(format!("{ENV_RATE_LIMIT_WINDOW} is not a duration: {e}"))
                })?;
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.rate_limit.max_requests == 0 {
            errors.push("rate_limit.max_requests must be at least 1");
        }
        if self.rate_limit.window.is_zero() {
            errors.push("rate_limit.window must be non-zero");
        }
        if self.rate_limit.sweep_interval.is_zero() {
            errors.push("rate_limit.sweep_interval must be non-zero");
        }
        if self.limits.max_input_chars == 0 {
            errors.push("limits.max_input_chars must be at least 1");
        }
        if self.limits.max_generate_count == 0 {
            errors.push("limits.max_generate_count must be at least 1");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(errors.join("; ")))
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address.
    pub listen_addr: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Key clients by `X-Forwarded-For` / `X-Real-IP` instead of the socket
    /// peer. Only safe behind a proxy that overwrites those headers.
    pub trust_forwarded_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            // 1M chars of 4-byte UTF-8 plus envelope overhead
            max_body_bytes: 4 * 1_000_000 + 64 * 1024,
            trust_forwarded_headers: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Input and generator bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    /// Maximum input length in characters.
    pub max_input_chars: usize,

    /// Upper bound for generator `count` options.
    pub max_generate_count: u32,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_chars: 1_000_000,
            max_generate_count: 100,
        }
    }
}

/// Fixed-window rate limit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window.
    pub max_requests: u32,

    /// Window length.
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// How often expired windows are swept from the counter store.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}
