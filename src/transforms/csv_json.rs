//! CSV <-> JSON conversion for simple, comma-separated tables.

use super::TransformOutput;
use crate::tools::options::{CsvDirection, CsvOptions};
use crate::types::Result;
use serde::Serialize;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Converted {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Value>,
    pub row_count: usize,
}

pub fn convert(input: &str, options: &CsvOptions) -> Result<TransformOutput<Converted>> {
    match options.direction {
        CsvDirection::CsvToJson => csv_to_json(input),
        CsvDirection::JsonToCsv => Ok(json_to_csv(input)),
    }
}

fn csv_to_json(input: &str) -> Result<TransformOutput<Converted>> {
    let lines: Vec<&str> = input.trim().lines().collect();
    let Some((header_line, rows)) = lines.split_first().filter(|(_, rows)| !rows.is_empty()) else {
        return Ok(TransformOutput::invalid(
            "CSV must have a header row and at least one data row",
        ));
    };

    let headers: Vec<String> = split_fields(header_line);
    let records: Vec<Value> = rows
        .iter()
        .map(|line| {
            let values = split_fields(line);
            let record: Map<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let raw = values.get(i).map(String::as_str).unwrap_or("");
                    (header.clone(), coerce(raw))
                })
                .collect();
            Value::Object(record)
        })
        .collect();

    let records = Value::Array(records);
    Ok(TransformOutput::valid(Converted {
        output: serde_json::to_string_pretty(&records)?,
        row_count: rows.len(),
        records: Some(records),
    }))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().replace('"', ""))
        .collect()
}

/// Integers stay integers; other finite numbers become floats; everything else is text.
fn coerce(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn json_to_csv(input: &str) -> TransformOutput<Converted> {
    let data: Value = match serde_json::from_str(input) {
        Ok(data) => data,
        Err(e) => return TransformOutput::invalid(format!("Invalid JSON: {e}")),
    };

    let rows = match data.as_array() {
        Some(rows) if !rows.is_empty() => rows,
        _ => return TransformOutput::invalid("JSON must be a non-empty array of objects"),
    };

    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match row.as_object() {
            Some(object) => objects.push(object),
            None => {
                return TransformOutput::invalid(format!("Element {i} is not an object"));
            }
        }
    }

    let mut headers: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut lines = Vec::with_capacity(objects.len() + 1);
    lines.push(headers.iter().map(|h| escape(h)).collect::<Vec<_>>().join(","));
    for object in &objects {
        let row: Vec<String> = headers
            .iter()
            .map(|h| object.get(*h).map(cell).unwrap_or_default())
            .collect();
        lines.push(row.join(","));
    }

    TransformOutput::valid(Converted {
        output: lines.join("\n"),
        records: None,
        row_count: objects.len(),
    })
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape(s),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => escape(&value.to_string()),
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
