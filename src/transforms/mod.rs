//! Tool transforms.
//!
//! Each transform is a function of its input and typed options. Failures that
//! come from the input's content (bad JSON, bad Base64, bad regex) are reported
//! in the returned [`TransformOutput`] with `isValid: false`, never as `Err`.
//! `Err` is reserved for infrastructure faults and bubbles to the orchestrator.

pub mod base64;
pub mod csv_json;
pub mod html_entities;
pub mod html_jsx;
pub mod json_formatter;
pub mod json_validator;
pub mod jwt;
pub mod lorem;
pub mod password;
pub mod regex_tester;
pub mod url;
pub mod uuid;
pub mod yaml_validator;

use serde::Serialize;

/// Uniform payload wrapper: tool-specific fields plus `isValid` / `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput<T> {
    #[serde(flatten)]
    pub data: T,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> TransformOutput<T> {
    pub fn valid(data: T) -> Self {
        Self {
            data,
            is_valid: true,
            error: None,
        }
    }

    /// Domain failure that still carries partial data.
    pub fn invalid_with(data: T, error: impl Into<String>) -> Self {
        Self {
            data,
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

impl<T: Default> TransformOutput<T> {
    /// Domain failure with an empty payload.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self::invalid_with(T::default(), error)
    }
}

/// Character count, as reported in sizes and offsets.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
