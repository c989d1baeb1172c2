//! HTML entity encoder/decoder.

use super::TransformOutput;
use crate::tools::options::{CodecMode, CodecOptions};
use crate::types::Result;
use serde::Serialize;

/// Longest entity body we look for between `&` and `;`.
const MAX_ENTITY_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub output: String,
}

pub fn transform(input: &str, options: &CodecOptions) -> Result<TransformOutput<Encoded>> {
    let output = match options.mode {
        CodecMode::Encode => encode(input),
        CodecMode::Decode => decode(input),
    };
    Ok(TransformOutput::valid(Encoded { output }))
}

pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Single pass: `&amp;lt;` decodes to `&lt;`, not `<`. Unknown entities are kept.
pub fn decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let resolved = tail
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| resolve(&tail[..end]).map(|c| (c, end)));

        match resolved {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(
            encode(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode("&lt;b&gt; &amp; &quot;q&quot; &#39;s&apos;"), "<b> & \"q\" 's'");
        assert_eq!(decode("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode("a&nbsp;b"), "a\u{a0}b");
    }

    #[test]
    fn test_decode_is_single_pass() {
        assert_eq!(decode("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_decode_leaves_unknown_and_bare_ampersands() {
        assert_eq!(decode("AT&T &copy; &; &#xZZ; a & b"), "AT&T &copy; &; &#xZZ; a & b");
        assert_eq!(decode("&&amp;"), "&&");
    }

    #[test]
    fn test_roundtrip_via_transform() {
        let text = "if (a < b && c > d) { return \"ok\"; }";
        let encoded = transform(text, &CodecOptions { mode: CodecMode::Encode }).unwrap();
        let decoded = transform(&encoded.data.output, &CodecOptions { mode: CodecMode::Decode }).unwrap();
        assert_eq!(decoded.data.output, text);
    }
}
