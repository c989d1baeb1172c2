//! Transform dispatch: tool id -> transform, through a closed match.

use crate::tools::{ToolKind, ToolOptions, ToolRegistry};
use crate::transforms::{self, html_jsx::HtmlJsxConverter, TransformOutput};
use crate::types::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Routes sanitized input to the transform registered for a tool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    jsx: HtmlJsxConverter,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Result<Self> {
        Ok(Self {
            registry,
            jsx: HtmlJsxConverter::new()?,
        })
    }

    /// Run the tool's transform and return its raw payload.
    ///
    /// Unknown ids are `Error::NotFound`; options decoded for a different tool
    /// are `Error::Internal`. Domain failures come back as `Ok` with
    /// `isValid: false` inside the payload.
    pub fn dispatch(&self, tool_id: &str, input: &str, options: &ToolOptions) -> Result<Value> {
        let kind = self
            .registry
            .resolve(tool_id)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool_id)))?
            .tool_kind()?;

        if options.kind() != kind {
            return Err(Error::internal(format!(
                "options for {} passed to {}",
                options.kind().id(),
                kind.id()
            )));
        }

        match options {
            ToolOptions::JsonFormatter(o) => to_payload(transforms::json_formatter::format(input, o)?),
            ToolOptions::JsonValidator(o) => to_payload(transforms::json_validator::validate(input, o)?),
            ToolOptions::YamlValidator(_) => to_payload(transforms::yaml_validator::validate(input)?),
            ToolOptions::Base64Encoder(o) => to_payload(transforms::base64::transform(input, o)?),
            ToolOptions::UrlEncoder(o) => to_payload(transforms::url::transform(input, o)?),
            ToolOptions::JwtDecoder(_) => to_payload(transforms::jwt::decode(input)?),
            ToolOptions::HtmlEntities(o) => to_payload(transforms::html_entities::transform(input, o)?),
            ToolOptions::RegexTester(o) => to_payload(transforms::regex_tester::test(input, o)?),
            ToolOptions::UuidGenerator(o) => to_payload(transforms::uuid::generate(o)?),
            ToolOptions::PasswordGenerator(o) => to_payload(transforms::password::generate(o)?),
            ToolOptions::LoremGenerator(o) => to_payload(transforms::lorem::generate(o)?),
            ToolOptions::CsvJsonConverter(o) => to_payload(transforms::csv_json::convert(input, o)?),
            ToolOptions::HtmlJsxConverter(_) => to_payload(self.jsx.convert(input)?),
        }
    }

    /// Every registered tool resolves to a transform.
    pub fn check_complete(&self) -> Result<()> {
        for descriptor in self.registry.list_all() {
            let kind = descriptor.tool_kind()?;
            if ToolKind::from_id(&descriptor.id) != Some(kind) {
                return Err(Error::internal(format!(
                    "tool {} has no transform",
                    descriptor.id
                )));
            }
        }
        Ok(())
    }
}

fn to_payload<T: Serialize>(output: TransformOutput<T>) -> Result<Value> {
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputLimits;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(ToolRegistry::builtin().unwrap())).unwrap()
    }

    fn options(kind: ToolKind, raw: Value) -> ToolOptions {
        ToolOptions::decode(kind, raw.as_object(), &InputLimits::default()).unwrap()
    }

    #[test]
    fn test_dispatches_formatter() {
        let out = dispatcher()
            .dispatch(
                "json-formatter",
                r#"{"b":1}"#,
                &options(ToolKind::JsonFormatter, json!({"indent": 0})),
            )
            .unwrap();
        assert_eq!(out["formatted"], r#"{"b":1}"#);
        assert_eq!(out["isValid"], true);
    }

    #[test]
    fn test_domain_failure_is_ok() {
        let out = dispatcher()
            .dispatch("jwt-decoder", "a.b.c", &options(ToolKind::JwtDecoder, json!({})))
            .unwrap();
        assert_eq!(out["isValid"], false);
        assert!(out["error"].as_str().unwrap().contains("Failed to decode JWT"));
    }

    #[test]
    fn test_unknown_tool_is_not_found() {
        let err = dispatcher()
            .dispatch("not-a-tool", "x", &options(ToolKind::JsonFormatter, json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_mismatched_options_rejected() {
        let err = dispatcher()
            .dispatch("url-encoder", "x", &options(ToolKind::HtmlEntities, json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_every_tool_dispatches() {
        let d = dispatcher();
        d.check_complete().unwrap();
        for kind in ToolKind::ALL {
            let input = match kind {
                ToolKind::JwtDecoder => "e30.e30.",
                ToolKind::RegexTester => "abc",
                ToolKind::CsvJsonConverter => "a,b\n1,2",
                _ => r#"{"a":1}"#,
            };
            let raw = match kind {
                ToolKind::RegexTester => json!({"pattern": "b"}),
                _ => json!({}),
            };
            let out = d.dispatch(kind.id(), input, &options(kind, raw)).unwrap();
            assert_eq!(out["isValid"], true, "{} -> {}", kind.id(), out);
        }
    }
}
