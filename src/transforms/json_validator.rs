//! JSON validator: syntax check plus optional JSON Schema validation.
//!
//! Schemas come from the caller, so they must be self-contained: any
//! reference that does not point inside the document is rejected before a
//! validator is built, and nothing is ever fetched.

use super::TransformOutput;
use crate::tools::options::JsonValidatorOptions;
use crate::types::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    pub message: String,
    pub errors: Vec<String>,
}

pub fn validate(input: &str, options: &JsonValidatorOptions) -> Result<TransformOutput<SchemaReport>> {
    let instance: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(e) => return Ok(rejected("Invalid JSON format", vec![e.to_string()])),
    };

    let schema = match &options.schema {
        None => {
            return Ok(TransformOutput::valid(SchemaReport {
                message: "Valid JSON format".to_string(),
                errors: Vec::new(),
            }))
        }
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(schema) => schema,
            Err(e) => return Ok(rejected("Invalid schema", vec![e.to_string()])),
        },
        Some(schema) => schema.clone(),
    };

    let external = external_references(&schema);
    if !external.is_empty() {
        let errors = external
            .into_iter()
            .map(|uri| format!("external reference not allowed: {uri}"))
            .collect();
        return Ok(rejected("Invalid schema", errors));
    }

    let validator = match jsonschema::validator_for(&schema) {
        Ok(validator) => validator,
        Err(e) => return Ok(rejected("Invalid schema", vec![e.to_string()])),
    };

    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(TransformOutput::valid(SchemaReport {
            message: "Valid JSON and matches schema".to_string(),
            errors,
        }))
    } else {
        Ok(rejected("JSON does not match schema", errors))
    }
}

const REFERENCE_KEYWORDS: [&str; 3] = ["$ref", "$dynamicRef", "$recursiveRef"];

/// Reference values that leave the document. `""` and `#...` stay inside it.
fn external_references(schema: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut pending = vec![schema];
    while let Some(node) = pending.pop() {
        match node {
            Value::Object(map) => {
                for (key, value) in map.iter().rev() {
                    match value {
                        Value::String(uri)
                            if REFERENCE_KEYWORDS.contains(&key.as_str())
                                && !uri.is_empty()
                                && !uri.starts_with('#') =>
                        {
                            found.push(uri.clone())
                        }
                        _ => pending.push(value),
                    }
                }
            }
            Value::Array(items) => pending.extend(items.iter().rev()),
            _ => {}
        }
    }
    found
}

fn rejected(message: &str, errors: Vec<String>) -> TransformOutput<SchemaReport> {
    let error = format!("{}: {}", message, errors.join("; "));
    TransformOutput::invalid_with(
        SchemaReport {
            message: message.to_string(),
            errors,
        },
        error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_schema(schema: Value) -> JsonValidatorOptions {
        JsonValidatorOptions {
            schema: Some(schema),
        }
    }

    #[test]
    fn test_syntax_only() {
        let out = validate(r#"{"a": [1, 2]}"#, &JsonValidatorOptions::default()).unwrap();
        assert!(out.is_valid);
        assert_eq!(out.data.message, "Valid JSON format");
    }

    #[test]
    fn test_syntax_error() {
        let out = validate("{oops}", &JsonValidatorOptions::default()).unwrap();
        assert!(!out.is_valid);
        assert_eq!(out.data.message, "Invalid JSON format");
        assert_eq!(out.data.errors.len(), 1);
        assert!(out.error.unwrap().starts_with("Invalid JSON format: "));
    }

    #[test]
    fn test_schema_violations_listed() {
        let schema = json!({
            "type": "object",
            "required": ["name", "age"],
            "properties": {"age": {"type": "integer"}}
        });
        let out = validate(r#"{"age": "old"}"#, &with_schema(schema)).unwrap();
        assert!(!out.is_valid);
        assert_eq!(out.data.message, "JSON does not match schema");
        assert_eq!(out.data.errors.len(), 2);
        assert!(out.data.errors.iter().any(|e| e.contains("name")));
    }

    #[test]
    fn test_schema_match() {
        let schema = json!({"type": "array", "items": {"type": "number"}});
        let out = validate("[1, 2.5]", &with_schema(schema)).unwrap();
        assert!(out.is_valid);
        assert!(out.data.errors.is_empty());
    }

    #[test]
    fn test_schema_given_as_string() {
        let options = with_schema(Value::String(r#"{"type": "string"}"#.to_string()));
        assert!(validate(r#""hi""#, &options).unwrap().is_valid);
        assert!(!validate("3", &options).unwrap().is_valid);
    }

    #[test]
    fn test_unparseable_schema_string() {
        let options = with_schema(Value::String("{not json".to_string()));
        let out = validate("1", &options).unwrap();
        assert!(!out.is_valid);
        assert_eq!(out.data.message, "Invalid schema");
    }

    #[test]
    fn test_local_references_resolve() {
        let schema = json!({
            "$defs": {"name": {"type": "string", "minLength": 1}},
            "type": "object",
            "properties": {"name": {"$ref": "#/$defs/name"}}
        });
        assert!(validate(r#"{"name": "a"}"#, &with_schema(schema.clone())).unwrap().is_valid);
        assert!(!validate(r#"{"name": ""}"#, &with_schema(schema)).unwrap().is_valid);
    }

    #[test]
    fn test_remote_and_file_references_rejected() {
        let schema = json!({
            "type": "object",
            "properties": {
                "cloud": {"$ref": "http://169.254.169.254/latest/meta-data"},
                "local": {"items": [{"$ref": "file:///etc/hostname"}]}
            }
        });
        let out = validate("{}", &with_schema(schema)).unwrap();
        assert!(!out.is_valid);
        assert_eq!(out.data.message, "Invalid schema");
        assert_eq!(
            out.data.errors,
            vec![
                "external reference not allowed: http://169.254.169.254/latest/meta-data",
                "external reference not allowed: file:///etc/hostname",
            ]
        );
    }

    #[test]
    fn test_relative_reference_with_remote_base_rejected() {
        let schema = json!({"$id": "https://example.com/root.json", "$ref": "other.json"});
        let out = validate("1", &with_schema(schema)).unwrap();
        assert!(!out.is_valid);
        assert!(out.error.unwrap().contains("other.json"));
    }

    #[test]
    fn test_invalid_schema_document() {
        let out = validate("1", &with_schema(json!({"type": 12}))).unwrap();
        assert!(!out.is_valid);
        assert_eq!(out.data.message, "Invalid schema");
    }
}
