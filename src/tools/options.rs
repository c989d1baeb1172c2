//! Typed option records, one per tool, behind a tagged union.
//!
//! Raw option maps are validated structurally first (see
//! [`crate::tools::validation`]); decoding then picks the record for the tool,
//! fills defaults and clamps numeric ranges.

use crate::tools::catalog::ToolKind;
use crate::types::{Error, InputLimits, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Encode/decode direction shared by the codec tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    #[default]
    Encode,
    Decode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CsvDirection {
    #[default]
    CsvToJson,
    JsonToCsv,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoremUnit {
    Words,
    Sentences,
    #[default]
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct JsonFormatterOptions {
    /// Spaces per level, clamped to 0-8. Zero produces compact output.
    pub indent: i64,
    pub minify: bool,
}

impl Default for JsonFormatterOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            minify: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct JsonValidatorOptions {
    /// Schema object, or a string containing one.
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Base64Options {
    pub mode: CodecMode,
    pub url_safe: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CodecOptions {
    pub mode: CodecMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RegexOptions {
    pub pattern: String,
    /// Any combination of `g`, `i`, `m`, `s`.
    pub flags: String,
}

impl Default for RegexOptions {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            flags: "g".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct UuidOptions {
    pub count: i64,
    pub uppercase: bool,
}

impl Default for UuidOptions {
    fn default() -> Self {
        Self {
            count: 1,
            uppercase: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct PasswordOptions {
    pub length: i64,
    pub count: i64,
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 12,
            count: 1,
            lowercase: true,
            uppercase: true,
            numbers: true,
            symbols: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct LoremOptions {
    pub unit: LoremUnit,
    pub count: i64,
}

impl Default for LoremOptions {
    fn default() -> Self {
        Self {
            unit: LoremUnit::Paragraphs,
            count: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CsvOptions {
    pub direction: CsvDirection,
}

/// Tools without options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoOptions {}

pub const MIN_PASSWORD_LENGTH: i64 = 4;
pub const MAX_PASSWORD_LENGTH: i64 = 128;
pub const MAX_INDENT: i64 = 8;

/// Decoded options, keyed by tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOptions {
    JsonFormatter(JsonFormatterOptions),
    JsonValidator(JsonValidatorOptions),
    YamlValidator(NoOptions),
    Base64Encoder(Base64Options),
    UrlEncoder(CodecOptions),
    JwtDecoder(NoOptions),
    HtmlEntities(CodecOptions),
    RegexTester(RegexOptions),
    UuidGenerator(UuidOptions),
    PasswordGenerator(PasswordOptions),
    LoremGenerator(LoremOptions),
    CsvJsonConverter(CsvOptions),
    HtmlJsxConverter(NoOptions),
}

impl ToolOptions {
    /// Decode a raw option map into the record for `kind`.
    ///
    /// Explicit nulls mean "use the default". Numeric options are clamped into
    /// their ranges instead of rejected.
    pub fn decode(
        kind: ToolKind,
        raw: Option<&Map<String, Value>>,
        limits: &InputLimits,
    ) -> Result<Self> {
        let map: Map<String, Value> = raw
            .map(|m| {
                m.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let value = Value::Object(map);
        let max_count = i64::from(limits.max_generate_count.max(1));

        let options = match kind {
            ToolKind::JsonFormatter => {
                let mut o: JsonFormatterOptions = parse(kind, value)?;
                o.indent = o.indent.clamp(0, MAX_INDENT);
                ToolOptions::JsonFormatter(o)
            }
            ToolKind::JsonValidator => ToolOptions::JsonValidator(parse(kind, value)?),
            ToolKind::YamlValidator => ToolOptions::YamlValidator(parse(kind, value)?),
            ToolKind::Base64Encoder => ToolOptions::Base64Encoder(parse(kind, value)?),
            ToolKind::UrlEncoder => ToolOptions::UrlEncoder(parse(kind, value)?),
            ToolKind::JwtDecoder => ToolOptions::JwtDecoder(parse(kind, value)?),
            ToolKind::HtmlEntities => ToolOptions::HtmlEntities(parse(kind, value)?),
            ToolKind::RegexTester => ToolOptions::RegexTester(parse(kind, value)?),
            ToolKind::UuidGenerator => {
                let mut o: UuidOptions = parse(kind, value)?;
                o.count = o.count.clamp(1, max_count);
                ToolOptions::UuidGenerator(o)
            }
            ToolKind::PasswordGenerator => {
                let mut o: PasswordOptions = parse(kind, value)?;
                o.length = o.length.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH);
                o.count = o.count.clamp(1, max_count);
                ToolOptions::PasswordGenerator(o)
            }
            ToolKind::LoremGenerator => {
                let mut o: LoremOptions = parse(kind, value)?;
                o.count = o.count.clamp(1, max_count);
                ToolOptions::LoremGenerator(o)
            }
            ToolKind::CsvJsonConverter => ToolOptions::CsvJsonConverter(parse(kind, value)?),
            ToolKind::HtmlJsxConverter => ToolOptions::HtmlJsxConverter(parse(kind, value)?),
        };
        Ok(options)
    }

    /// Which tool these options belong to.
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolOptions::JsonFormatter(_) => ToolKind::JsonFormatter,
            ToolOptions::JsonValidator(_) => ToolKind::JsonValidator,
            ToolOptions::YamlValidator(_) => ToolKind::YamlValidator,
            ToolOptions::Base64Encoder(_) => ToolKind::Base64Encoder,
            ToolOptions::UrlEncoder(_) => ToolKind::UrlEncoder,
            ToolOptions::JwtDecoder(_) => ToolKind::JwtDecoder,
            ToolOptions::HtmlEntities(_) => ToolKind::HtmlEntities,
            ToolOptions::RegexTester(_) => ToolKind::RegexTester,
            ToolOptions::UuidGenerator(_) => ToolKind::UuidGenerator,
            ToolOptions::PasswordGenerator(_) => ToolKind::PasswordGenerator,
            ToolOptions::LoremGenerator(_) => ToolKind::LoremGenerator,
            ToolOptions::CsvJsonConverter(_) => ToolKind::CsvJsonConverter,
            ToolOptions::HtmlJsxConverter(_) => ToolKind::HtmlJsxConverter,
        }
    }

    /// JSON Schema of the option record for `kind`, for discovery.
    pub fn schema(kind: ToolKind) -> Value {
        let schema = match kind {
            ToolKind::JsonFormatter => schemars::schema_for!(JsonFormatterOptions),
            ToolKind::JsonValidator => schemars::schema_for!(JsonValidatorOptions),
            ToolKind::Base64Encoder => schemars::schema_for!(Base64Options),
            ToolKind::UrlEncoder | ToolKind::HtmlEntities => schemars::schema_for!(CodecOptions),
            ToolKind::RegexTester => schemars::schema_for!(RegexOptions),
            ToolKind::UuidGenerator => schemars::schema_for!(UuidOptions),
            ToolKind::PasswordGenerator => schemars::schema_for!(PasswordOptions),
            ToolKind::LoremGenerator => schemars::schema_for!(LoremOptions),
            ToolKind::CsvJsonConverter => schemars::schema_for!(CsvOptions),
            ToolKind::YamlValidator | ToolKind::JwtDecoder | ToolKind::HtmlJsxConverter => {
                schemars::schema_for!(NoOptions)
            }
        };
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }
}

fn parse<T: DeserializeOwned>(kind: ToolKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::validation(format!("invalid options for {}: {}", kind.id(), e)))
}
