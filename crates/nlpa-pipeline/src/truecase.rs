//! Truecasing pre-pass for uncased input
//!
//! An NER model trained on lowercased text finds entities that the cased
//! model misses in lowercase transcripts. Its hits are used to restore an
//! initial capital on every entity token before the main parse. Case is
//! only changed where one character maps to exactly one character, so
//! character offsets stay valid against the original text.

use nlpa_core::Result;

use crate::NlpPipeline;

/// Lowercase `text` without changing its length in characters
pub fn lowercase_preserving_offsets(text: &str) -> String {
    text.chars().map(lower_char).collect()
}

fn lower_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Uppercase the characters at the given character offsets
pub fn capitalize_at(text: &str, offsets: &[usize]) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for &i in offsets {
        if let Some(c) = chars.get_mut(i) {
            *c = upper_char(*c);
        }
    }
    chars.into_iter().collect()
}

/// Runs the uncased NER model and rebuilds a truecased input text
pub struct Truecaser {
    ner: Box<dyn NlpPipeline>,
}

impl Truecaser {
    pub fn new(ner: Box<dyn NlpPipeline>) -> Self {
        Self { ner }
    }

    pub fn model(&self) -> &str {
        self.ner.model()
    }

    /// Lowercase the text, then capitalize the first character of every
    /// token the uncased model tags as part of an entity
    pub async fn truecase(&self, text: &str) -> Result<String> {
        let lowered = lowercase_preserving_offsets(text);
        let doc = self.ner.parse(&lowered).await?;

        let entity_starts: Vec<usize> = doc
            .tokens
            .iter()
            .filter(|tok| !tok.ent_type.is_empty())
            .map(|tok| tok.idx)
            .collect();

        tracing::debug!(
            model = self.ner.model(),
            entity_tokens = entity_starts.len(),
            "Truecased input text"
        );

        Ok(capitalize_at(&lowered, &entity_starts))
    }
}
