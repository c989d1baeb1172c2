//! Regex tester: compile a pattern with flags and report matches.

use super::TransformOutput;
use crate::tools::options::RegexOptions;
use crate::types::Result;
use regex::RegexBuilder;
use serde::Serialize;
use serde_json::{Map, Value};

/// Matches reported per request.
pub const MAX_MATCHES: usize = 1000;
const SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexReport {
    pub pattern: String,
    pub flags: String,
    pub matches: Vec<RegexMatch>,
    pub match_count: usize,
    pub truncated: bool,
}

/// Offsets are in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub groups: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub named_groups: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    global: bool,
    case_insensitive: bool,
    multi_line: bool,
    dot_all: bool,
}

fn parse_flags(flags: &str) -> std::result::Result<Flags, String> {
    let mut parsed = Flags::default();
    for c in flags.chars() {
        match c {
            'g' => parsed.global = true,
            'i' => parsed.case_insensitive = true,
            'm' => parsed.multi_line = true,
            's' => parsed.dot_all = true,
            other => return Err(format!("Invalid regex flag '{other}'")),
        }
    }
    Ok(parsed)
}

pub fn test(input: &str, options: &RegexOptions) -> Result<TransformOutput<RegexReport>> {
    let base = RegexReport {
        pattern: options.pattern.clone(),
        flags: options.flags.clone(),
        ..RegexReport::default()
    };

    let flags = match parse_flags(&options.flags) {
        Ok(flags) => flags,
        Err(e) => return Ok(TransformOutput::invalid_with(base, e)),
    };

    let regex = match RegexBuilder::new(&options.pattern)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_all)
        .size_limit(SIZE_LIMIT)
        .build()
    {
        Ok(regex) => regex,
        Err(e) => return Ok(TransformOutput::invalid_with(base, format!("Invalid regular expression: {e}"))),
    };

    let limit = if flags.global { MAX_MATCHES } else { 1 };
    let names: Vec<Option<&str>> = regex.capture_names().collect();

    let mut matches = Vec::new();
    let mut truncated = false;
    // Running byte/char cursor so offsets stay linear in the input size.
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for caps in regex.captures_iter(input) {
        if matches.len() == limit {
            truncated = flags.global;
            break;
        }
        let Some(whole) = caps.get(0) else { continue };

        char_cursor += input[byte_cursor..whole.start()].chars().count();
        byte_cursor = whole.start();
        let start = char_cursor;
        let end = start + whole.as_str().chars().count();

        let mut groups = Vec::with_capacity(caps.len().saturating_sub(1));
        let mut named_groups = Map::new();
        for (i, name) in names.iter().enumerate().skip(1) {
            let text = caps.get(i).map(|m| m.as_str().to_string());
            if let Some(name) = name {
                named_groups.insert(
                    (*name).to_string(),
                    text.clone().map(Value::String).unwrap_or(Value::Null),
                );
            }
            groups.push(text);
        }

        matches.push(RegexMatch {
            text: whole.as_str().to_string(),
            start,
            end,
            groups,
            named_groups,
        });
    }

    Ok(TransformOutput::valid(RegexReport {
        match_count: matches.len(),
        matches,
        truncated,
        ..base
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pattern: &str, flags: &str) -> RegexOptions {
        RegexOptions {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
        }
    }

    #[test]
    fn test_global_matches_with_groups() {
        let out = test("a1 b22 c333", &opts(r"([a-z])(\d+)", "g")).unwrap();
        assert!(out.is_valid);
        assert_eq!(out.data.match_count, 3);
        let second = &out.data.matches[1];
        assert_eq!(second.text, "b22");
        assert_eq!((second.start, second.end), (3, 6));
        assert_eq!(second.groups, vec![Some("b".to_string()), Some("22".to_string())]);
    }

    #[test]
    fn test_without_global_only_first() {
        let out = test("x x x", &opts("x", "")).unwrap();
        assert_eq!(out.data.match_count, 1);
        assert!(!out.data.truncated);
    }

    #[test]
    fn test_case_insensitive_and_named_groups() {
        let out = test("Hello HELLO", &opts(r"(?P<word>hello)", "gi")).unwrap();
        assert_eq!(out.data.match_count, 2);
        assert_eq!(out.data.matches[1].named_groups["word"], "HELLO");
    }

    #[test]
    fn test_offsets_count_characters() {
        let out = test("héé-x", &opts("x", "g")).unwrap();
        assert_eq!(out.data.matches[0].start, 4);
    }

    #[test]
    fn test_multiline_and_dotall() {
        let text = "one\ntwo";
        assert_eq!(test(text, &opts("^two$", "g")).unwrap().data.match_count, 0);
        assert_eq!(test(text, &opts("^two$", "gm")).unwrap().data.match_count, 1);
        assert_eq!(test(text, &opts("one.two", "g")).unwrap().data.match_count, 0);
        assert_eq!(test(text, &opts("one.two", "gs")).unwrap().data.match_count, 1);
    }

    #[test]
    fn test_invalid_pattern_is_domain_error() {
        let out = test("abc", &opts("(unclosed", "g")).unwrap();
        assert!(!out.is_valid);
        assert!(out.error.unwrap().starts_with("Invalid regular expression"));
        assert_eq!(out.data.pattern, "(unclosed");
    }

    #[test]
    fn test_unknown_flag() {
        let out = test("abc", &opts("a", "gx")).unwrap();
        assert_eq!(out.error.as_deref(), Some("Invalid regex flag 'x'"));
    }

    #[test]
    fn test_match_limit() {
        let input = "a".repeat(MAX_MATCHES + 5);
        let out = test(&input, &opts("a", "g")).unwrap();
        assert_eq!(out.data.match_count, MAX_MATCHES);
        assert!(out.data.truncated);
    }

    #[test]
    fn test_unmatched_optional_group() {
        let out = test("ac", &opts("a(b)?c", "g")).unwrap();
        assert_eq!(out.data.matches[0].groups, vec![None]);
    }
}
