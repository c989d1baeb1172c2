//! Input validation: structural checks of input and options per tool.
//!
//! Never runs a transform. Every violated constraint is reported, not just the
//! first one.

use crate::tools::catalog::{ParamDef, ToolRegistry};
use crate::types::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Three dot-separated base64url segments, each optionally `=` padded; the
/// signature may be empty.
const JWT_SHAPE: &str = r"^[A-Za-z0-9_-]+=*\.[A-Za-z0-9_-]+=*\.[A-Za-z0-9_-]*=*$";

/// Shape contract a tool declares for its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRule {
    /// Non-empty text up to the size limit.
    Text,
    /// A compact JWT serialization.
    Jwt,
    /// Input may be absent (generators).
    Optional,
}

/// Result of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<String>) -> Self {
        if violations.is_empty() {
            return Self::valid();
        }
        Self {
            is_valid: false,
            error: Some(violations.join("; ")),
            violations,
        }
    }
}

/// Per-tool structural validator.
#[derive(Debug, Clone)]
pub struct InputValidator {
    registry: Arc<ToolRegistry>,
    max_input_chars: usize,
    jwt_shape: Regex,
}

impl InputValidator {
    pub fn new(registry: Arc<ToolRegistry>, max_input_chars: usize) -> Result<Self> {
        let jwt_shape = Regex::new(JWT_SHAPE)
            .map_err(|e| Error::internal(format!("jwt shape pattern: {e}")))?;
        Ok(Self {
            registry,
            max_input_chars,
            jwt_shape,
        })
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Validate input and options against the tool's declared contract.
    ///
    /// An unknown tool id is an `Error::NotFound`, never an invalid outcome.
    pub fn validate(
        &self,
        tool_id: &str,
        input: &str,
        options: Option<&Map<String, Value>>,
    ) -> Result<ValidationOutcome> {
        let descriptor = self
            .registry
            .resolve(tool_id)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_id)))?;

        let empty = Map::new();
        let mut violations = self.check_input(descriptor.input_rule, input);
        violations.extend(check_options(&descriptor.parameters, options.unwrap_or(&empty)));

        Ok(ValidationOutcome::from_violations(violations))
    }

    fn check_input(&self, rule: InputRule, input: &str) -> Vec<String> {
        let mut violations = Vec::new();

        // Byte length bounds char count from above; only count when it matters.
        if input.len() > self.max_input_chars {
            let chars = input.chars().count();
            if chars > self.max_input_chars {
                violations.push(format!(
                    "input exceeds maximum length of {} characters (got {})",
                    self.max_input_chars, chars
                ));
            }
        }

        match rule {
            InputRule::Optional => {}
            InputRule::Text => {
                if input.is_empty() {
                    violations.push("input must not be empty".to_string());
                }
            }
            InputRule::Jwt => {
                if input.is_empty() {
                    violations.push("input must not be empty".to_string());
                }
                if !self.jwt_shape.is_match(input) {
                    violations.push(
                        "input must be a JWT: three base64url segments separated by '.'"
                            .to_string(),
                    );
                }
            }
        }

        violations
    }
}

/// Check provided options against parameter definitions.
fn check_options(parameters: &[ParamDef], options: &Map<String, Value>) -> Vec<String> {
    let mut violations = Vec::new();

    for param in parameters {
        let provided = options.get(&param.name).is_some_and(|v| !v.is_null());
        if param.is_required() && !provided {
            violations.push(format!("missing required option: {}", param.name));
        }
    }

    let known: HashMap<&str, &ParamDef> =
        parameters.iter().map(|p| (p.name.as_str(), p)).collect();

    for (key, value) in options {
        match known.get(key.as_str()) {
            Some(param) => {
                // Explicit null on a defaulted option means "use the default".
                if value.is_null() && param.default.is_some() {
                    continue;
                }
                if let Err(e) = param.param_type.validate(value) {
                    violations.push(format!("option '{}': {}", key, e));
                }
            }
            None => violations.push(format!("unknown option: {}", key)),
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> InputValidator {
        InputValidator::new(Arc::new(ToolRegistry::builtin().unwrap()), 1_000_000).unwrap()
    }

    fn opts(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_tool_accepts_plain_input() {
        let outcome = validator()
            .validate("json-formatter", r#"{"a":1}"#, None)
            .unwrap();
        assert_eq!(outcome, ValidationOutcome::valid());
    }

    #[test]
    fn test_text_tool_rejects_empty_input() {
        let outcome = validator().validate("base64-encoder", "", None).unwrap();
        assert!(!outcome.is_valid);
        assert_eq!(outcome.error.as_deref(), Some("input must not be empty"));
    }

    #[test]
    fn test_generator_accepts_empty_input() {
        let outcome = validator().validate("uuid-generator", "", None).unwrap();
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_unknown_tool_is_not_found_error() {
        let err = validator().validate("not-a-tool", "x", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_jwt_shape() {
        let v = validator();
        assert!(v.validate("jwt-decoder", "a.b.c", None).unwrap().is_valid);
        assert!(v.validate("jwt-decoder", "aaa.bbb.", None).unwrap().is_valid);
        let outcome = v.validate("jwt-decoder", "only.two", None).unwrap();
        assert!(!outcome.is_valid);
        assert!(outcome.error.unwrap().contains("three base64url segments"));
    }

    #[test]
    fn test_jwt_shape_allows_trailing_padding() {
        let v = validator();
        assert!(v.validate("jwt-decoder", "eyJhIjoxfQ==.e30.", None).unwrap().is_valid);
        assert!(v.validate("jwt-decoder", "a=.b==.c=", None).unwrap().is_valid);
        assert!(!v.validate("jwt-decoder", "=a.b.c", None).unwrap().is_valid);
        assert!(!v.validate("jwt-decoder", "a=b.c.d", None).unwrap().is_valid);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let outcome = validator()
            .validate(
                "jwt-decoder",
                "",
                Some(&opts(json!({"verify": true}))),
            )
            .unwrap();
        assert_eq!(
            outcome.violations,
            vec![
                "input must not be empty".to_string(),
                "input must be a JWT: three base64url segments separated by '.'".to_string(),
                "unknown option: verify".to_string(),
            ]
        );
        assert_eq!(outcome.error.unwrap(), outcome.violations.join("; "));
    }

    #[test]
    fn test_option_types_checked() {
        let outcome = validator()
            .validate(
                "json-formatter",
                "{}",
                Some(&opts(json!({"indent": "four", "minify": 1}))),
            )
            .unwrap();
        assert_eq!(outcome.violations.len(), 2);
        assert!(outcome.violations[0].contains("option 'indent': expected integer"));
        assert!(outcome.violations[1].contains("option 'minify': expected boolean"));
    }

    #[test]
    fn test_required_option_missing() {
        let outcome = validator().validate("regex-tester", "abc", None).unwrap();
        assert_eq!(
            outcome.violations,
            vec!["missing required option: pattern".to_string()]
        );
    }

    #[test]
    fn test_enum_option_checked() {
        let outcome = validator()
            .validate("url-encoder", "a b", Some(&opts(json!({"mode": "rot13"}))))
            .unwrap();
        assert!(outcome.error.unwrap().contains("expected one of: encode, decode"));
    }

    #[test]
    fn test_null_option_falls_back_to_default() {
        let outcome = validator()
            .validate("json-formatter", "{}", Some(&opts(json!({"indent": null}))))
            .unwrap();
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_input_length_bound() {
        let v = InputValidator::new(Arc::new(ToolRegistry::builtin().unwrap()), 4).unwrap();
        assert!(v.validate("url-encoder", "äöüß", None).unwrap().is_valid);
        let outcome = v.validate("url-encoder", "abcde", None).unwrap();
        assert_eq!(
            outcome.error.as_deref(),
            Some("input exceeds maximum length of 4 characters (got 5)")
        );
        assert!(!v.validate("uuid-generator", "12345", None).unwrap().is_valid);
    }
}
