//! Markup sanitization for tool input and output.
//!
//! Strips script blocks, `javascript:` schemes and inline event-handler
//! attributes. Never rejects anything: rejecting is the validator's job.
//!
//! Stripping is one left-to-right pass over a character stack. After each
//! push, a pattern can only complete at the top of the stack, so it is cut
//! there and the remaining prefix is already clean. Nested payloads such as
//! `<scr<script></script>ipt>` therefore collapse in the same pass, the output
//! contains no pattern, and a second pass is always a no-op. Cost is linear in
//! the input length.
//!
//! Patterns, all ASCII case-insensitive:
//! - `<script` followed by a non-word character, up to the next `</script>`
//! - `javascript:`
//! - an `on`-prefixed word at a word boundary, optional whitespace, then `=`

use serde_json::{Map, Value};

const SCRIPT_OPEN: &str = "<script";
const SCRIPT_CLOSE: &str = "</script>";
const JAVASCRIPT_SCHEME: &str = "javascript:";

/// Stateless markup stripper. Cheap to copy around.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Sanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Strip unsafe patterns and surrounding whitespace from free text.
    pub fn sanitize_input(&self, text: &str) -> String {
        self.strip(text.trim()).trim().to_string()
    }

    /// Sanitize a transform result before it leaves the pipeline.
    ///
    /// A bare string gets the full input treatment. Compound values have every
    /// nested string (and object key) stripped in place, without trimming.
    pub fn sanitize_output(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.sanitize_input(&s)),
            Value::Array(_) | Value::Object(_) => self.strip_value(value),
            other => other,
        }
    }

    fn strip_value(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.strip(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.strip_value(v)).collect())
            }
            Value::Object(map) => {
                let mut cleaned = Map::with_capacity(map.len());
                for (key, v) in map {
                    cleaned.insert(self.strip(&key), self.strip_value(v));
                }
                Value::Object(cleaned)
            }
            other => other,
        }
    }

    fn strip(&self, text: &str) -> String {
        let open_len = SCRIPT_OPEN.len();
        let mut out: Vec<char> = Vec::with_capacity(text.len());
        // Start offsets of confirmed `<script\b` openings, ascending.
        let mut opens: Vec<usize> = Vec::new();

        for c in text.chars() {
            out.push(c);
            let len = out.len();

            if !is_word(c) && ends_with_ignore_case(&out[..len - 1], SCRIPT_OPEN) {
                opens.push(len - 1 - open_len);
            }

            let cut = match c {
                '>' if ends_with_ignore_case(&out, SCRIPT_CLOSE) => opens.first().copied(),
                ':' if ends_with_ignore_case(&out, JAVASCRIPT_SCHEME) => {
                    Some(len - JAVASCRIPT_SCHEME.len())
                }
                '=' => event_handler_start(&out),
                _ => None,
            };

            if let Some(start) = cut {
                out.truncate(start);
                // An opening survives only while its confirming character does.
                while opens.last().is_some_and(|&open| open + open_len >= out.len()) {
                    opens.pop();
                }
            }
        }

        out.into_iter().collect()
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn ends_with_ignore_case(chars: &[char], pattern: &str) -> bool {
    let n = pattern.len();
    chars.len() >= n
        && chars[chars.len() - n..]
            .iter()
            .zip(pattern.chars())
            .all(|(c, p)| c.eq_ignore_ascii_case(&p))
}

/// Start of an `on<word>\s*=` handler ending at the top of `chars`.
fn event_handler_start(chars: &[char]) -> Option<usize> {
    let (&last, rest) = chars.split_last()?;
    if last != '=' {
        return None;
    }
    let mut end = rest.len();
    while end > 0 && rest[end - 1].is_whitespace() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && is_word(rest[start - 1]) {
        start -= 1;
    }
    let word = &rest[start..end];
    let is_handler = word.len() > 2
        && word[0].eq_ignore_ascii_case(&'o')
        && word[1].eq_ignore_ascii_case(&'n');
    is_handler.then_some(start)
}
