//! URL percent-encoding, component style.

use super::TransformOutput;
use crate::tools::options::{CodecMode, CodecOptions};
use crate::types::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub output: String,
}

pub fn transform(input: &str, options: &CodecOptions) -> Result<TransformOutput<Encoded>> {
    let out = match options.mode {
        CodecMode::Encode => TransformOutput::valid(Encoded {
            output: urlencoding::encode(input).into_owned(),
        }),
        CodecMode::Decode => match urlencoding::decode(input) {
            Ok(decoded) => TransformOutput::valid(Encoded {
                output: decoded.into_owned(),
            }),
            Err(e) => TransformOutput::invalid(format!("Invalid percent-encoding: {e}")),
        },
    };
    Ok(out)
}
