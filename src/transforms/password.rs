//! Password generator with a coarse strength estimate.

use super::TransformOutput;
use crate::tools::options::PasswordOptions;
use crate::types::Result;
use rand::Rng;
use serde::Serialize;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPassword {
    pub value: String,
    pub strength: Strength,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub passwords: Vec<GeneratedPassword>,
    pub length: usize,
    pub charset_size: usize,
}

pub fn generate(options: &PasswordOptions) -> Result<TransformOutput<Generated>> {
    Ok(generate_with(&mut rand::thread_rng(), options))
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, options: &PasswordOptions) -> TransformOutput<Generated> {
    let charset: Vec<char> = [
        (options.lowercase, LOWERCASE),
        (options.uppercase, UPPERCASE),
        (options.numbers, NUMBERS),
        (options.symbols, SYMBOLS),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .flat_map(|(_, set)| set.chars())
    .collect();

    if charset.is_empty() {
        return TransformOutput::invalid("Select at least one character set");
    }

    let length = usize::try_from(options.length).unwrap_or(0).max(1);
    let count = usize::try_from(options.count).unwrap_or(0).max(1);

    let passwords = (0..count)
        .map(|_| {
            let value: String = (0..length)
                .map(|_| charset[rng.gen_range(0..charset.len())])
                .collect();
            GeneratedPassword {
                strength: strength(&value),
                value,
            }
        })
        .collect();

    TransformOutput::valid(Generated {
        passwords,
        length,
        charset_size: charset.len(),
    })
}

/// One point each for length >= 8, length >= 12, and each character class present.
pub fn strength(password: &str) -> Strength {
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    match checks.iter().filter(|passed| **passed).count() {
        0..=2 => Strength::Weak,
        3..=4 => Strength::Medium,
        _ => Strength::Strong,
    }
}
