//! JSON formatter: pretty-print, minify, and syntax check.

use super::{char_len, TransformOutput};
use crate::tools::options::JsonFormatterOptions;
use crate::types::{Error, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatted {
    pub formatted: String,
    pub size: usize,
    pub line_count: usize,
}

pub fn format(input: &str, options: &JsonFormatterOptions) -> Result<TransformOutput<Formatted>> {
    let value: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(e) => return Ok(TransformOutput::invalid(e.to_string())),
    };

    let formatted = if options.minify || options.indent <= 0 {
        serde_json::to_string(&value)?
    } else {
        let width = usize::try_from(options.indent).unwrap_or(2);
        to_indented(&value, width)?
    };

    Ok(TransformOutput::valid(Formatted {
        size: char_len(&formatted),
        line_count: formatted.matches('\n').count() + 1,
        formatted,
    }))
}

fn to_indented(value: &Value, width: usize) -> Result<String> {
    let indent = " ".repeat(width);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| Error::internal(format!("formatter produced invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn opts(indent: i64, minify: bool) -> JsonFormatterOptions {
        JsonFormatterOptions { indent, minify }
    }

    #[test]
    fn test_formats_with_default_indent() {
        let out = format(r#"{"name":"test","value":123}"#, &JsonFormatterOptions::default()).unwrap();
        assert!(out.is_valid);
        assert_eq!(out.data.formatted, "{\n  \"name\": \"test\",\n  \"value\": 123\n}");
        assert_eq!(out.data.line_count, 4);
        assert_eq!(out.data.size, out.data.formatted.len());
    }

    #[test]
    fn test_invalid_json_reports_error() {
        let out = format(r#"{"name":"test",}"#, &JsonFormatterOptions::default()).unwrap();
        assert!(!out.is_valid);
        assert!(!out.error.unwrap().is_empty());
        assert_eq!(out.data.formatted, "");
    }

    #[test]
    fn test_trailing_comma_in_object() {
        let out = format(r#"{"a":1,}"#, &JsonFormatterOptions::default()).unwrap();
        assert!(!out.is_valid);
        assert!(out.error.is_some());
    }

    #[test]
    fn test_minify() {
        let out = format("{\n  \"name\": \"test\",\n  \"value\": 123\n}", &opts(2, true)).unwrap();
        assert_eq!(out.data.formatted, r#"{"name":"test","value":123}"#);
        assert_eq!(out.data.line_count, 1);
    }

    #[test]
    fn test_custom_indent_and_key_order() {
        let out = format(r#"{"z":[1,2],"a":null}"#, &opts(4, false)).unwrap();
        assert_eq!(
            out.data.formatted,
            "{\n    \"z\": [\n        1,\n        2\n    ],\n    \"a\": null\n}"
        );
    }

    #[test]
    fn test_zero_indent_is_compact() {
        let out = format("[1, 2]", &opts(0, false)).unwrap();
        assert_eq!(out.data.formatted, "[1,2]");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            "[a-zA-Z0-9 \"\\\\]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                    .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn property_pretty_output_round_trips(value in arb_json(), indent in 1i64..=8) {
            let input = serde_json::to_string(&value).unwrap();
            let out = format(&input, &opts(indent, false)).unwrap();
            prop_assert!(out.is_valid);
            let reparsed: Value = serde_json::from_str(&out.data.formatted).unwrap();
            prop_assert_eq!(reparsed, value);
        }

        #[test]
        fn property_minified_never_longer(value in arb_json()) {
            let input = serde_json::to_string_pretty(&value).unwrap();
            let pretty = format(&input, &opts(2, false)).unwrap();
            let minified = format(&input, &opts(2, true)).unwrap();
            prop_assert!(minified.data.formatted.len() <= pretty.data.formatted.len());
        }
    }
}
