//! Request orchestration: the single entry point for running a tool.
//!
//! ```text
//! Received -> RateChecked -> Sanitized -> Validated -> Dispatched -> Completed
//!      \___________\______________\___________\____________\_____> Rejected
//! ```
//!
//! Every outcome, including panics inside a transform, becomes a
//! [`ToolResult`]. Nothing escapes to the caller as an error.

use crate::dispatch::Dispatcher;
use crate::rate_limit::{RateLimitDecision, RateLimiter};
use crate::recovery::with_recovery;
use crate::sanitizer::Sanitizer;
use crate::tools::{InputValidator, ToolOptions, ToolRegistry};
use crate::types::{ClientKey, Config, Error, ErrorCode, InputLimits, RequestId, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Message returned to callers over their quota.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// Pipeline position of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
    Received,
    RateChecked,
    Sanitized,
    Validated,
    Dispatched,
    Completed,
    Rejected,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Received => "received",
            RequestStage::RateChecked => "rate_checked",
            RequestStage::Sanitized => "sanitized",
            RequestStage::Validated => "validated",
            RequestStage::Dispatched => "dispatched",
            RequestStage::Completed => "completed",
            RequestStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Boundary request envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub tool_id: String,
    pub input: String,
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Milliseconds spent in the transform.
    pub processing_time: f64,
    /// Characters of input handed to the transform.
    pub input_size: usize,
    /// Characters of the serialized transform result.
    pub output_size: usize,
}

/// Uniform result envelope. A failed result never carries data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ResultMetadata>,
}

impl ToolResult {
    pub fn ok(data: Value, metadata: ResultMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            metadata: Some(metadata),
        }
    }

    pub fn failure(code: ErrorCode, error: impl Into<String>, metadata: Option<ResultMetadata>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code),
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn metadata(&self) -> Option<&ResultMetadata> {
        self.metadata.as_ref()
    }
}

/// Result plus the limiter decision, when the limiter was consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub result: ToolResult,
    pub rate_limit: Option<RateLimitDecision>,
}

struct Processed {
    data: Value,
    metadata: ResultMetadata,
}

/// Runs tool requests through limiter, sanitizer, validator and dispatcher.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    limiter: Arc<RateLimiter>,
    pipeline: Arc<Pipeline>,
}

/// CPU-bound stages after the rate gate. Runs on the blocking pool.
#[derive(Debug)]
struct Pipeline {
    registry: Arc<ToolRegistry>,
    sanitizer: Sanitizer,
    validator: InputValidator,
    dispatcher: Dispatcher,
    limits: InputLimits,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        limiter: Arc<RateLimiter>,
        limits: InputLimits,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::new(Arc::clone(&registry))?;
        dispatcher.check_complete()?;
        let pipeline = Pipeline {
            validator: InputValidator::new(Arc::clone(&registry), limits.max_input_chars)?,
            sanitizer: Sanitizer::new(),
            dispatcher,
            registry,
            limits,
        };
        Ok(Self {
            limiter,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Built-in catalog with an in-memory limiter, from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::builtin()?);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit)?);
        Self::new(registry, limiter, config.limits.clone())
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.pipeline.registry
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn limits(&self) -> &InputLimits {
        &self.pipeline.limits
    }

    pub async fn handle_request(&self, request: &ToolRequest, client_key: &ClientKey) -> ToolResponse {
        self.handle(
            &request.tool_id,
            &request.input,
            request.options.as_ref(),
            client_key,
        )
        .await
    }

    /// Run one request end to end.
    pub async fn handle(
        &self,
        tool_id: &str,
        raw_input: &str,
        options: Option<&Map<String, Value>>,
        client_key: &ClientKey,
    ) -> ToolResponse {
        let request_id = RequestId::new();

        let decision = match self.limiter.allow(client_key).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(
                    "rate_limiter_failed: request_id={}, tool={}, error={}",
                    request_id,
                    tool_id,
                    e
                );
                return ToolResponse {
                    result: ToolResult::failure(e.code(), e.public_message(), None),
                    rate_limit: None,
                };
            }
        };

        if !decision.allowed {
            log_rejection(&request_id, tool_id, RequestStage::Received, &Error::rate_limited(client_key.as_str()));
            return ToolResponse {
                result: ToolResult::failure(ErrorCode::RateLimited, RATE_LIMIT_MESSAGE, None),
                rate_limit: Some(decision),
            };
        }

        let started = Instant::now();
        let (outcome, stage) = self.run_pipeline(tool_id, raw_input, options).await;

        let result = match outcome {
            Ok(processed) => {
                tracing::info!(
                    "tool_request_completed: request_id={}, tool={}, input_len={}, processing_ms={:.3}",
                    request_id,
                    tool_id,
                    processed.metadata.input_size,
                    processed.metadata.processing_time
                );
                ToolResult::ok(processed.data, processed.metadata)
            }
            Err(e) => {
                log_rejection(&request_id, tool_id, stage, &e);
                let metadata = ResultMetadata {
                    processing_time: elapsed_ms(started),
                    input_size: raw_input.chars().count(),
                    output_size: 0,
                };
                ToolResult::failure(e.code(), e.public_message(), Some(metadata))
            }
        };

        ToolResponse {
            result,
            rate_limit: Some(decision),
        }
    }

    /// Run the stages after the rate gate off the async workers.
    ///
    /// Returns the outcome and the last stage reached.
    async fn run_pipeline(
        &self,
        tool_id: &str,
        raw_input: &str,
        options: Option<&Map<String, Value>>,
    ) -> (Result<Processed>, RequestStage) {
        let pipeline = Arc::clone(&self.pipeline);
        let tool_id = tool_id.to_string();
        let raw_input = raw_input.to_string();
        let options = options.cloned();

        let joined = tokio::task::spawn_blocking(move || {
            let mut stage = RequestStage::RateChecked;
            let outcome = with_recovery(
                || pipeline.process(&tool_id, &raw_input, options.as_ref(), &mut stage),
                "tool_pipeline",
            );
            (outcome, stage)
        })
        .await;

        joined.unwrap_or_else(|e| {
            (
                Err(Error::internal(format!("pipeline task failed: {e}"))),
                RequestStage::RateChecked,
            )
        })
    }
}

impl Pipeline {
    /// Steps after the rate gate. `stage` tracks the last stage reached.
    fn process(
        &self,
        tool_id: &str,
        raw_input: &str,
        options: Option<&Map<String, Value>>,
        stage: &mut RequestStage,
    ) -> Result<Processed> {
        let input = self.sanitizer.sanitize_input(raw_input);
        *stage = RequestStage::Sanitized;

        let outcome = self.validator.validate(tool_id, &input, options)?;
        if !outcome.is_valid {
            return Err(Error::validation(outcome.error.unwrap_or_default()));
        }
        let kind = self
            .registry
            .resolve(tool_id)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_id)))?
            .tool_kind()?;
        let options = ToolOptions::decode(kind, options, &self.limits)?;
        *stage = RequestStage::Validated;

        let started = Instant::now();
        let raw = self.dispatcher.dispatch(tool_id, &input, &options)?;
        let processing_time = elapsed_ms(started);
        *stage = RequestStage::Dispatched;

        let output_size = serde_json::to_string(&raw)?.chars().count();
        let data = self.sanitizer.sanitize_output(raw);
        *stage = RequestStage::Completed;

        Ok(Processed {
            data,
            metadata: ResultMetadata {
                processing_time,
                input_size: input.chars().count(),
                output_size,
            },
        })
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn log_rejection(request_id: &RequestId, tool_id: &str, reached: RequestStage, error: &Error) {
    match error.code() {
        ErrorCode::Internal => tracing::error!(
            "request_failed: request_id={}, tool={}, stage={}, last_stage={}, error={}",
            request_id,
            tool_id,
            RequestStage::Rejected,
            reached,
            error
        ),
        code => tracing::debug!(
            "request_rejected: request_id={}, tool={}, stage={}, last_stage={}, code={}, error={}",
            request_id,
            tool_id,
            RequestStage::Rejected,
            reached,
            code.as_str(),
            error
        ),
    }
}
