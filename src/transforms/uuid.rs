//! UUID v4 generator.

use super::TransformOutput;
use crate::tools::options::UuidOptions;
use crate::types::Result;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub uuids: Vec<String>,
    pub count: usize,
}

pub fn generate(options: &UuidOptions) -> Result<TransformOutput<Generated>> {
    let count = usize::try_from(options.count.max(1)).unwrap_or(1);
    let uuids: Vec<String> = (0..count)
        .map(|_| {
            let id = Uuid::new_v4().to_string();
            if options.uppercase {
                id.to_uppercase()
            } else {
                id
            }
        })
        .collect();

    Ok(TransformOutput::valid(Generated {
        count: uuids.len(),
        uuids,
    }))
}
