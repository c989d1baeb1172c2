//! HTML to JSX conversion.
//!
//! Works at the tag level: each start tag is re-rendered attribute by
//! attribute, so attribute names inside text content are never touched.

use super::TransformOutput;
use crate::types::{Error, Result};
use regex::{Captures, Regex};
use serde::Serialize;

const COMMENT: &str = r"(?s)<!--(.*?)-->";
const START_TAG: &str = r#"<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=/>"']+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#;
const ATTRIBUTE: &str = r#"([^\s=/>"']+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// HTML attribute names that JSX spells differently.
const RENAMED_ATTRIBUTES: &[(&str, &str)] = &[
    ("class", "className"),
    ("for", "htmlFor"),
    ("tabindex", "tabIndex"),
    ("readonly", "readOnly"),
    ("maxlength", "maxLength"),
    ("minlength", "minLength"),
    ("colspan", "colSpan"),
    ("rowspan", "rowSpan"),
    ("contenteditable", "contentEditable"),
    ("crossorigin", "crossOrigin"),
    ("autocomplete", "autoComplete"),
    ("autofocus", "autoFocus"),
    ("autoplay", "autoPlay"),
    ("enctype", "encType"),
    ("accesskey", "accessKey"),
    ("cellpadding", "cellPadding"),
    ("cellspacing", "cellSpacing"),
    ("frameborder", "frameBorder"),
    ("allowfullscreen", "allowFullScreen"),
    ("srcset", "srcSet"),
    ("novalidate", "noValidate"),
    ("usemap", "useMap"),
    ("datetime", "dateTime"),
    ("spellcheck", "spellCheck"),
    ("inputmode", "inputMode"),
    ("http-equiv", "httpEquiv"),
    ("accept-charset", "acceptCharset"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub jsx: String,
}

#[derive(Debug, Clone)]
pub struct HtmlJsxConverter {
    comment: Regex,
    start_tag: Regex,
    attribute: Regex,
}

impl HtmlJsxConverter {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::internal(format!("jsx pattern: {e}")))
        };
        Ok(Self {
            comment: compile(COMMENT)?,
            start_tag: compile(START_TAG)?,
            attribute: compile(ATTRIBUTE)?,
        })
    }

    pub fn convert(&self, input: &str) -> Result<TransformOutput<Converted>> {
        let without_comments = self.comment.replace_all(input, "{/*$1*/}");
        let jsx = self
            .start_tag
            .replace_all(&without_comments, |caps: &Captures<'_>| self.render_tag(caps));
        Ok(TransformOutput::valid(Converted {
            jsx: jsx.into_owned(),
        }))
    }

    fn render_tag(&self, caps: &Captures<'_>) -> String {
        let name = &caps[1];
        let attributes = caps.get(2).map_or("", |m| m.as_str());
        let self_closing = !caps[3].is_empty() || VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str());

        let mut out = format!("<{name}");
        for attr in self.attribute.captures_iter(attributes) {
            out.push(' ');
            out.push_str(&render_attribute(&attr[1], attr.get(2).map(|m| m.as_str())));
        }
        out.push_str(if self_closing { " />" } else { ">" });
        out
    }
}

fn render_attribute(name: &str, value: Option<&str>) -> String {
    let lower = name.to_ascii_lowercase();
    let jsx_name = if lower.starts_with("data-") || lower.starts_with("aria-") {
        name.to_string()
    } else {
        RENAMED_ATTRIBUTES
            .iter()
            .find(|(html, _)| *html == lower)
            .map_or_else(|| name.to_string(), |(_, jsx)| (*jsx).to_string())
    };

    match value {
        None => format!("{jsx_name}={{true}}"),
        Some(raw) if lower == "style" => format!("style={{{{{}}}}}", style_object(unquote(raw))),
        Some(raw) if raw.starts_with('"') || raw.starts_with('\'') => format!("{jsx_name}={raw}"),
        Some(raw) => format!("{jsx_name}=\"{raw}\""),
    }
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
        .unwrap_or(raw)
}

/// `color: red; font-size: 12px` -> `color: "red", fontSize: "12px"`.
fn style_object(css: &str) -> String {
    css.split(';')
        .filter_map(|declaration| {
            let (prop, value) = declaration.split_once(':')?;
            let prop = prop.trim();
            if prop.is_empty() {
                return None;
            }
            Some(format!(
                "{}: \"{}\"",
                camel_case(prop),
                value.trim().replace('"', "\\\"")
            ))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `font-size` -> `fontSize`, `-webkit-transition` -> `WebkitTransition`, `-ms-flex` -> `msFlex`.
fn camel_case(prop: &str) -> String {
    let (capitalize_first, body) = match prop.strip_prefix('-') {
        Some(rest) if rest.starts_with("ms-") => (false, rest),
        Some(rest) => (true, rest),
        None => (false, prop),
    };

    let mut out = String::with_capacity(body.len());
    for (i, segment) in body.split('-').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if i > 0 || capitalize_first => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(segment),
        }
    }
    out
}
