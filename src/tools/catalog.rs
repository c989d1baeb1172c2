//! Tool registry: static descriptors, categories and option contracts.
//!
//! The descriptor table is the single source of truth for which tools exist.
//! It is built once at startup, checked for completeness against [`ToolKind`],
//! and read-only afterwards.

use crate::tools::validation::InputRule;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Tool kinds
// =============================================================================

/// Closed set of tool implementations. Every variant must have a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    JsonFormatter,
    JsonValidator,
    YamlValidator,
    Base64Encoder,
    UrlEncoder,
    JwtDecoder,
    HtmlEntities,
    RegexTester,
    UuidGenerator,
    PasswordGenerator,
    LoremGenerator,
    CsvJsonConverter,
    HtmlJsxConverter,
}

impl ToolKind {
    pub const ALL: [ToolKind; 13] = [
        ToolKind::JsonFormatter,
        ToolKind::JsonValidator,
        ToolKind::YamlValidator,
        ToolKind::Base64Encoder,
        ToolKind::UrlEncoder,
        ToolKind::JwtDecoder,
        ToolKind::HtmlEntities,
        ToolKind::RegexTester,
        ToolKind::UuidGenerator,
        ToolKind::PasswordGenerator,
        ToolKind::LoremGenerator,
        ToolKind::CsvJsonConverter,
        ToolKind::HtmlJsxConverter,
    ];

    /// Stable slug used on the wire.
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::JsonFormatter => "json-formatter",
            ToolKind::JsonValidator => "json-validator",
            ToolKind::YamlValidator => "yaml-validator",
            ToolKind::Base64Encoder => "base64-encoder",
            ToolKind::UrlEncoder => "url-encoder",
            ToolKind::JwtDecoder => "jwt-decoder",
            ToolKind::HtmlEntities => "html-entities",
            ToolKind::RegexTester => "regex-tester",
            ToolKind::UuidGenerator => "uuid-generator",
            ToolKind::PasswordGenerator => "password-generator",
            ToolKind::LoremGenerator => "lorem-generator",
            ToolKind::CsvJsonConverter => "csv-json-converter",
            ToolKind::HtmlJsxConverter => "html-jsx-converter",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int,
    Bool,
    /// Any non-null JSON value (objects, or strings holding JSON).
    Json,
    Enum(Vec<String>),
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::Json => {
                if value.is_null() {
                    Err("expected a JSON value, got null".to_string())
                } else {
                    Ok(())
                }
            }
            ParamType::Enum(variants) => {
                if let Some(s) = value.as_str() {
                    if variants.iter().any(|v| v == s) {
                        Ok(())
                    } else {
                        Err(format!(
                            "invalid enum value '{}', expected one of: {}",
                            s,
                            variants.join(", ")
                        ))
                    }
                } else {
                    Err(format!("expected string for enum, got {}", value_type_name(value)))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// Human-readable type name for discovery listings.
    pub fn display_name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Int => "integer".to_string(),
            ParamType::Bool => "boolean".to_string(),
            ParamType::Json => "json".to_string(),
            ParamType::Enum(variants) => format!("enum({})", variants.join("|")),
            ParamType::Optional(inner) => format!("{}?", inner.display_name()),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single option definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamDef {
    fn new(name: &str, param_type: ParamType, description: &str, default: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            default,
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.param_type, ParamType::Optional(_))
    }

    /// Short signature: `name?: type`.
    pub fn signature(&self) -> String {
        let optional = if self.is_required() { "" } else { "?" };
        format!("{}{}: {}", self.name, optional, self.param_type.display_name())
    }
}

// =============================================================================
// Categories and descriptors
// =============================================================================

/// Grouping metadata. No behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCategory {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ToolCategory {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Complete, immutable tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub id: String,
    #[serde(skip)]
    pub kind: Option<ToolKind>,
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    pub keywords: Vec<String>,
    pub features: Vec<String>,
    pub is_available: bool,
    pub input_rule: InputRule,
    pub parameters: Vec<ParamDef>,
}

impl ToolDescriptor {
    /// Resolved implementation. Descriptors built by the registry always carry one.
    pub fn tool_kind(&self) -> Result<ToolKind> {
        self.kind
            .ok_or_else(|| Error::internal(format!("tool '{}' has no implementation", self.id)))
    }

    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
            category: self.category.id.clone(),
        }
    }
}

/// Discovery listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub category: String,
}

// =============================================================================
// Registry
// =============================================================================

/// Read-only lookup over the descriptor table.
#[derive(Debug)]
pub struct ToolRegistry {
    categories: Vec<ToolCategory>,
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate ids and dangling categories.
    pub fn new(categories: Vec<ToolCategory>, tools: Vec<ToolDescriptor>) -> Result<Self> {
        let category_ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        let mut index = HashMap::with_capacity(tools.len());

        for (position, tool) in tools.iter().enumerate() {
            if tool.id.is_empty() {
                return Err(Error::validation("Tool id cannot be empty"));
            }
            if !category_ids.contains(tool.category.id.as_str()) {
                return Err(Error::validation(format!(
                    "Tool '{}' references unknown category '{}'",
                    tool.id, tool.category.id
                )));
            }
            if let Some(kind) = tool.kind {
                if kind.id() != tool.id {
                    return Err(Error::validation(format!(
                        "Tool '{}' is bound to implementation '{}'",
                        tool.id,
                        kind.id()
                    )));
                }
            }
            if index.insert(tool.id.clone(), position).is_some() {
                return Err(Error::validation(format!("Duplicate tool id: {}", tool.id)));
            }
        }

        Ok(Self {
            categories,
            tools,
            index,
        })
    }

    /// The built-in catalog, checked so that every [`ToolKind`] is registered.
    pub fn builtin() -> Result<Self> {
        let registry = Self::new(builtin_categories(), builtin_tools())?;
        let missing: Vec<&str> = ToolKind::ALL
            .iter()
            .filter(|kind| registry.resolve(kind.id()).and_then(|d| d.kind) != Some(**kind))
            .map(|kind| kind.id())
            .collect();
        if !missing.is_empty() {
            return Err(Error::internal(format!(
                "Tools without descriptors: {}",
                missing.join(", ")
            )));
        }
        Ok(registry)
    }

    /// Look up a tool by id. Not-found is an ordinary outcome.
    pub fn resolve(&self, tool_id: &str) -> Option<&ToolDescriptor> {
        self.index.get(tool_id).map(|&i| &self.tools[i])
    }

    pub fn has_tool(&self, tool_id: &str) -> bool {
        self.index.contains_key(tool_id)
    }

    /// All descriptors in definition order.
    pub fn list_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn list_by_category(&self, category_id: &str) -> Vec<&ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.category.id == category_id)
            .collect()
    }

    pub fn list_available(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|t| t.is_available).collect()
    }

    pub fn categories(&self) -> &[ToolCategory] {
        &self.categories
    }

    pub fn category(&self, category_id: &str) -> Option<&ToolCategory> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Discovery listing of available tools.
    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.list_available().into_iter().map(|t| t.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// =============================================================================
// Built-in table
// =============================================================================

const TEXT_PROCESSING: usize = 0;
const VALIDATORS: usize = 1;
const GENERATORS: usize = 2;
const CONVERTERS: usize = 3;

fn builtin_categories() -> Vec<ToolCategory> {
    vec![
        ToolCategory::new(
            "text-processing",
            "Text & Data Processing",
            "Tools for formatting, encoding, and processing text data",
        ),
        ToolCategory::new(
            "validators",
            "Validators & Formatters",
            "Validate and format various data formats",
        ),
        ToolCategory::new(
            "generators",
            "Generators",
            "Generate random data for testing and development",
        ),
        ToolCategory::new(
            "converters",
            "Converters",
            "Convert between different data formats",
        ),
        ToolCategory::new(
            "advanced",
            "Advanced Tools",
            "Advanced utilities for developers",
        ),
    ]
}

fn mode_param(default: &str) -> ParamDef {
    ParamDef::new(
        "mode",
        ParamType::Enum(vec!["encode".to_string(), "decode".to_string()]),
        "Direction of the conversion",
        Some(json!(default)),
    )
}

fn count_param(default: u32, what: &str) -> ParamDef {
    ParamDef::new(
        "count",
        ParamType::Int,
        &format!("Number of {what} to generate (1-100)"),
        Some(json!(default)),
    )
}

fn flag_param(name: &str, default: bool, description: &str) -> ParamDef {
    ParamDef::new(name, ParamType::Bool, description, Some(json!(default)))
}

struct Entry {
    kind: ToolKind,
    name: &'static str,
    description: &'static str,
    category: usize,
    keywords: &'static [&'static str],
    features: &'static [&'static str],
    input_rule: InputRule,
    parameters: Vec<ParamDef>,
}

fn builtin_tools() -> Vec<ToolDescriptor> {
    let categories = builtin_categories();
    let entries = vec![
        Entry {
            kind: ToolKind::JsonFormatter,
            name: "JSON Formatter",
            description: "Format, validate, and beautify JSON data",
            category: TEXT_PROCESSING,
            keywords: &["json", "formatter", "beautifier", "validator"],
            features: &["Format JSON", "Validate syntax", "Minify JSON", "Error detection"],
            input_rule: InputRule::Text,
            parameters: vec![
                ParamDef::new(
                    "indent",
                    ParamType::Int,
                    "Spaces per indentation level (0-8)",
                    Some(json!(2)),
                ),
                flag_param("minify", false, "Emit compact JSON"),
            ],
        },
        Entry {
            kind: ToolKind::JsonValidator,
            name: "JSON Schema Validator",
            description: "Validate JSON data against a JSON Schema",
            category: VALIDATORS,
            keywords: &["json", "schema", "validator"],
            features: &["Syntax validation", "JSON Schema checks", "Error listing"],
            input_rule: InputRule::Text,
            parameters: vec![ParamDef::new(
                "schema",
                ParamType::Optional(Box::new(ParamType::Json)),
                "JSON Schema as an object or a JSON string",
                None,
            )],
        },
        Entry {
            kind: ToolKind::YamlValidator,
            name: "YAML Validator",
            description: "Check YAML syntax for configuration files and manifests",
            category: VALIDATORS,
            keywords: &["yaml", "validator", "kubernetes", "config"],
            features: &["Syntax validation", "Error location", "Normalized output"],
            input_rule: InputRule::Text,
            parameters: vec![],
        },
        Entry {
            kind: ToolKind::Base64Encoder,
            name: "Base64 Encoder/Decoder",
            description: "Encode and decode Base64 strings",
            category: TEXT_PROCESSING,
            keywords: &["base64", "encoder", "decoder", "encoding"],
            features: &["Text to Base64", "Base64 to text", "URL safe encoding"],
            input_rule: InputRule::Text,
            parameters: vec![
                mode_param("encode"),
                flag_param("urlSafe", false, "Use the URL-safe alphabet without padding"),
            ],
        },
        Entry {
            kind: ToolKind::UrlEncoder,
            name: "URL Encoder/Decoder",
            description: "Convert strings to URL-safe format and vice versa",
            category: TEXT_PROCESSING,
            keywords: &["url", "encoder", "decoder", "uri"],
            features: &["URL encoding", "URL decoding", "Query parameters", "Safe URLs"],
            input_rule: InputRule::Text,
            parameters: vec![mode_param("encode")],
        },
        Entry {
            kind: ToolKind::JwtDecoder,
            name: "JWT Decoder",
            description: "View JWT payloads during API testing",
            category: TEXT_PROCESSING,
            keywords: &["jwt", "decoder", "token", "authentication"],
            features: &["Decode JWT", "View payload", "Header inspection"],
            input_rule: InputRule::Jwt,
            parameters: vec![],
        },
        Entry {
            kind: ToolKind::HtmlEntities,
            name: "HTML Entities Encoder/Decoder",
            description: "Encode special characters in HTML, decode them too",
            category: TEXT_PROCESSING,
            keywords: &["html", "entities", "encoder", "decoder"],
            features: &["HTML encoding", "HTML decoding", "Special characters", "XSS prevention"],
            input_rule: InputRule::Text,
            parameters: vec![mode_param("encode")],
        },
        Entry {
            kind: ToolKind::RegexTester,
            name: "Regex Tester & Builder",
            description: "Write and test regular expressions with highlighting",
            category: TEXT_PROCESSING,
            keywords: &["regex", "regular expressions", "pattern", "testing"],
            features: &["Pattern testing", "Match highlighting", "Flags support", "Capture groups"],
            input_rule: InputRule::Text,
            parameters: vec![
                ParamDef::new("pattern", ParamType::String, "Regular expression", None),
                ParamDef::new(
                    "flags",
                    ParamType::String,
                    "Any of g (all matches), i, m, s",
                    Some(json!("g")),
                ),
            ],
        },
        Entry {
            kind: ToolKind::UuidGenerator,
            name: "UUID / GUID Generator",
            description: "Generate random identifiers for projects",
            category: GENERATORS,
            keywords: &["uuid", "guid", "generator", "identifier"],
            features: &["UUID v4", "Bulk generation", "Unique IDs"],
            input_rule: InputRule::Optional,
            parameters: vec![
                count_param(1, "UUIDs"),
                flag_param("uppercase", false, "Uppercase hex digits"),
            ],
        },
        Entry {
            kind: ToolKind::PasswordGenerator,
            name: "Random Password Generator",
            description: "For app signups, demos, etc",
            category: GENERATORS,
            keywords: &["password", "generator", "random", "security"],
            features: &["Custom length", "Character sets", "Strength meter", "Secure passwords"],
            input_rule: InputRule::Optional,
            parameters: vec![
                ParamDef::new(
                    "length",
                    ParamType::Int,
                    "Password length (4-128)",
                    Some(json!(12)),
                ),
                count_param(1, "passwords"),
                flag_param("lowercase", true, "Include a-z"),
                flag_param("uppercase", true, "Include A-Z"),
                flag_param("numbers", true, "Include 0-9"),
                flag_param("symbols", false, "Include punctuation symbols"),
            ],
        },
        Entry {
            kind: ToolKind::LoremGenerator,
            name: "Lorem Ipsum Generator",
            description: "Generate dummy text",
            category: GENERATORS,
            keywords: &["lorem", "ipsum", "dummy text", "placeholder"],
            features: &["Words/sentences/paragraphs", "Custom count", "Placeholder text"],
            input_rule: InputRule::Optional,
            parameters: vec![
                ParamDef::new(
                    "unit",
                    ParamType::Enum(vec![
                        "words".to_string(),
                        "sentences".to_string(),
                        "paragraphs".to_string(),
                    ]),
                    "What to count",
                    Some(json!("paragraphs")),
                ),
                count_param(3, "units"),
            ],
        },
        Entry {
            kind: ToolKind::CsvJsonConverter,
            name: "CSV ↔ JSON Converter",
            description: "Convert CSV rows to JSON objects and back",
            category: CONVERTERS,
            keywords: &["csv", "json", "converter", "spreadsheet"],
            features: &["CSV to JSON", "JSON to CSV", "Header detection", "Number coercion"],
            input_rule: InputRule::Text,
            parameters: vec![ParamDef::new(
                "direction",
                ParamType::Enum(vec!["csv-to-json".to_string(), "json-to-csv".to_string()]),
                "Conversion direction",
                Some(json!("csv-to-json")),
            )],
        },
        Entry {
            kind: ToolKind::HtmlJsxConverter,
            name: "HTML to JSX Converter",
            description: "Convert HTML markup to JSX for React components",
            category: CONVERTERS,
            keywords: &["html", "jsx", "react", "converter"],
            features: &["className/htmlFor", "Style objects", "Self-closing tags", "Boolean attributes"],
            input_rule: InputRule::Text,
            parameters: vec![],
        },
    ];

    entries
        .into_iter()
        .map(|e| ToolDescriptor {
            id: e.kind.id().to_string(),
            kind: Some(e.kind),
            name: e.name.to_string(),
            description: e.description.to_string(),
            category: categories[e.category].clone(),
            keywords: e.keywords.iter().map(|s| s.to_string()).collect(),
            features: e.features.iter().map(|s| s.to_string()).collect(),
            is_available: true,
            input_rule: e.input_rule,
            parameters: e.parameters,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
