//! Request handlers and the boundary error type.

use super::client::ClientIdentity;
use crate::orchestrator::{Orchestrator, ToolResult};
use crate::rate_limit::RateLimitDecision;
use crate::tools::{ToolKind, ToolOptions, ToolSummary};
use crate::types::{Error, ErrorCode};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// See `ServerConfig::trust_forwarded_headers`.
    pub trust_forwarded_headers: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// Failure answered with the result envelope and its taxonomy status.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.code() == ErrorCode::Internal {
            tracing::error!("api_internal_error: {}", err);
        }
        Self {
            code: err.code(),
            message: err.public_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ToolResult::failure(self.code, self.message, None);
        (self.code.status(), Json(body)).into_response()
    }
}

// ============================================================================
// Discovery
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tools: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        tools: state.orchestrator.registry().len(),
    })
}

#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolSummary>,
    pub count: usize,
}

/// Available tools only.
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools: Vec<ToolSummary> = state
        .orchestrator
        .registry()
        .list_available()
        .into_iter()
        .map(|d| d.summary())
        .collect();
    Json(ToolListResponse {
        count: tools.len(),
        tools,
    })
}

/// Full descriptor with parameter definitions and the options schema.
pub async fn get_tool(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let descriptor = state
        .orchestrator
        .registry()
        .resolve(&tool_id)
        .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_id)))?;
    let kind: ToolKind = descriptor.tool_kind()?;

    let mut body = serde_json::to_value(descriptor).map_err(Error::from)?;
    if let Value::Object(fields) = &mut body {
        fields.insert("optionsSchema".to_string(), ToolOptions::schema(kind));
    }
    Ok(Json(body))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Value> {
    let categories = state.orchestrator.registry().categories();
    Json(json!({
        "categories": categories,
        "count": categories.len(),
    }))
}

pub async fn list_category_tools(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let registry = state.orchestrator.registry();
    let category = registry
        .category(&category_id)
        .ok_or_else(|| Error::not_found(format!("Unknown category: {}", category_id)))?;
    let tools: Vec<ToolSummary> = registry
        .list_by_category(&category_id)
        .into_iter()
        .map(|d| d.summary())
        .collect();

    Ok(Json(json!({
        "category": category,
        "count": tools.len(),
        "tools": tools,
    })))
}

// ============================================================================
// Invocation
// ============================================================================

/// POST body for a tool run.
#[derive(Debug, Deserialize)]
pub struct InvokeBody {
    pub input: String,
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
}

/// Run a tool. Malformed bodies are rejected before the rate limiter.
pub async fn run_tool(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    client: ClientIdentity,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|e| ApiError::invalid_request(format!("Invalid request data: {e}")))?;
    let invoke: InvokeBody = serde_json::from_slice(&body)
        .map_err(|e| ApiError::invalid_request(format!("Invalid request data: {e}")))?;

    let max_chars = state.orchestrator.limits().max_input_chars;
    if invoke.input.len() > max_chars && invoke.input.chars().count() > max_chars {
        return Err(ApiError::invalid_request(format!(
            "Invalid request data: input exceeds maximum length of {} characters",
            max_chars
        )));
    }

    let response = state
        .orchestrator
        .handle(&tool_id, &invoke.input, invoke.options.as_ref(), &client.key())
        .await;

    let status = response
        .result
        .code()
        .map(ErrorCode::status)
        .unwrap_or(StatusCode::OK);

    let mut headers = HeaderMap::new();
    if let Some(decision) = &response.rate_limit {
        insert_rate_limit_headers(&mut headers, decision);
    }

    Ok((status, headers, Json(response.result)).into_response())
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_at));
    if !decision.allowed {
        headers.insert(RETRY_AFTER, HeaderValue::from(decision.retry_after_secs(Utc::now())));
    }
}
