//! Lorem ipsum placeholder text.

use super::TransformOutput;
use crate::tools::options::{LoremOptions, LoremUnit};
use crate::types::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

const SENTENCE_WORDS: std::ops::RangeInclusive<usize> = 5..=14;
const PARAGRAPH_SENTENCES: std::ops::RangeInclusive<usize> = 3..=7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub text: String,
    pub unit: LoremUnit,
    pub count: usize,
    pub word_count: usize,
}

pub fn generate(options: &LoremOptions) -> Result<TransformOutput<Generated>> {
    Ok(generate_with(&mut rand::thread_rng(), options))
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, options: &LoremOptions) -> TransformOutput<Generated> {
    let count = usize::try_from(options.count).unwrap_or(0).max(1);

    let text = match options.unit {
        LoremUnit::Words => words(rng, count),
        LoremUnit::Sentences => (0..count).map(|_| sentence(&mut *rng)).collect::<Vec<_>>().join(" "),
        LoremUnit::Paragraphs => (0..count)
            .map(|_| paragraph(&mut *rng))
            .collect::<Vec<_>>()
            .join("\n\n"),
    };

    TransformOutput::valid(Generated {
        word_count: text.split_whitespace().count(),
        text,
        unit: options.unit,
        count,
    })
}

fn words<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n = rng.gen_range(SENTENCE_WORDS);
    let body = words(rng, n);
    let mut chars = body.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n = rng.gen_range(PARAGRAPH_SENTENCES);
    (0..n).map(|_| sentence(&mut *rng)).collect::<Vec<_>>().join(" ")
}
