//! YAML validator: parse, report the error location, and re-emit normalized.

use super::TransformOutput;
use crate::types::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YamlReport {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type: Option<&'static str>,
    pub line_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

pub fn validate(input: &str) -> Result<TransformOutput<YamlReport>> {
    let line_count = input.lines().count();

    let value: serde_yaml::Value = match serde_yaml::from_str(input) {
        Ok(value) => value,
        Err(e) => {
            let location = e.location();
            return Ok(TransformOutput::invalid_with(
                YamlReport {
                    line_count,
                    line: location.as_ref().map(|l| l.line()),
                    column: location.as_ref().map(|l| l.column()),
                    ..YamlReport::default()
                },
                e.to_string(),
            ));
        }
    };

    let formatted = serde_yaml::to_string(&value)
        .map_err(|e| Error::internal(format!("yaml re-emit failed: {e}")))?;
    Ok(TransformOutput::valid(YamlReport {
        formatted,
        root_type: Some(root_type(&value)),
        line_count,
        line: None,
        column: None,
    }))
}

fn root_type(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged",
    }
}
