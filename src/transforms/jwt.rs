//! JWT decoder. Decodes header and payload; the signature is not verified.

use super::TransformOutput;
use crate::types::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedJwt {
    pub header: Value,
    pub payload: Value,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

pub fn decode(input: &str) -> Result<TransformOutput<DecodedJwt>> {
    let parts: Vec<&str> = input.split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return Ok(TransformOutput::invalid(format!(
            "Invalid JWT format: expected 3 segments, found {}",
            parts.len()
        )));
    };

    let header = decode_segment("header", header);
    let payload = decode_segment("payload", payload);

    let out = match (header, payload) {
        (Ok(header), Ok(payload)) => {
            let algorithm = header.get("alg").and_then(Value::as_str).map(str::to_string);
            TransformOutput::valid(DecodedJwt {
                header,
                payload,
                signature: signature.to_string(),
                algorithm,
            })
        }
        (header, payload) => {
            let errors: Vec<String> = [header.err(), payload.err()].into_iter().flatten().collect();
            TransformOutput::invalid(format!("Failed to decode JWT: {}", errors.join("; ")))
        }
    };
    Ok(out)
}

fn decode_segment(name: &str, segment: &str) -> std::result::Result<Value, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| format!("{name} is not valid base64url ({e})"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("{name} is not valid JSON ({e})"))
}
