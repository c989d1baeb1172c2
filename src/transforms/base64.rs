//! Base64 encoder/decoder, standard or URL-safe alphabet.

use super::TransformOutput;
use crate::tools::options::{Base64Options, CodecMode};
use crate::types::Result;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub output: String,
}

pub fn transform(input: &str, options: &Base64Options) -> Result<TransformOutput<Encoded>> {
    let out = match options.mode {
        CodecMode::Encode => {
            let output = if options.url_safe {
                URL_SAFE_NO_PAD.encode(input.as_bytes())
            } else {
                STANDARD.encode(input.as_bytes())
            };
            TransformOutput::valid(Encoded { output })
        }
        CodecMode::Decode => decode(input),
    };
    Ok(out)
}

/// Accepts either alphabet, with or without padding and embedded whitespace.
fn decode(input: &str) -> TransformOutput<Encoded> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = match STANDARD_NO_PAD.decode(normalized.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => return TransformOutput::invalid(format!("Invalid Base64 input: {e}")),
    };

    match String::from_utf8(bytes) {
        Ok(output) => TransformOutput::valid(Encoded { output }),
        Err(_) => TransformOutput::invalid("Decoded bytes are not valid UTF-8 text"),
    }
}
