//! Character offset alignment
//!
//! Tokens carry character offsets; chunks, sentences and entities are
//! token-index ranges. The offset table maps between the two. All
//! offsets are counted in Unicode scalar values, not bytes.

use std::collections::HashMap;

use crate::parsed::{ParsedDoc, TokenSpan};

/// Token index -> (start, end) character span
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    spans: Vec<(usize, usize)>,
    by_start: HashMap<usize, usize>,
    by_end: HashMap<usize, usize>,
}

impl OffsetTable {
    /// Build the table once per parsed document
    pub fn new(doc: &ParsedDoc) -> Self {
        let mut table = Self::default();
        for (i, tok) in doc.tokens.iter().enumerate() {
            let span = (tok.idx, tok.end());
            table.spans.push(span);
            table.by_start.entry(span.0).or_insert(i);
            table.by_end.insert(span.1, i);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Character span of token `i`
    pub fn token(&self, i: usize) -> Option<(usize, usize)> {
        self.spans.get(i).copied()
    }

    /// Character span of a token range: start of its first token to end of
    /// its last. `None` when the range is empty or out of bounds.
    pub fn span(&self, range: TokenSpan) -> Option<(usize, usize)> {
        if range.is_empty() {
            return None;
        }
        let (start, _) = self.token(range.start)?;
        let (_, end) = self.token(range.end - 1)?;
        Some((start, end))
    }

    /// Token range exactly covering the characters `start..end`, if both
    /// ends fall on token boundaries
    pub fn char_span_to_tokens(&self, start: usize, end: usize) -> Option<TokenSpan> {
        if end <= start {
            return None;
        }
        let first = *self.by_start.get(&start)?;
        let last = *self.by_end.get(&end)?;
        (first <= last).then(|| TokenSpan::new(first, last + 1))
    }
}

/// Character-indexed view of a text, for slicing by character offsets
#[derive(Debug, Clone)]
pub struct CharText<'a> {
    text: &'a str,
    /// Byte offset of every character, plus the text length
    boundaries: Vec<usize>,
}

impl<'a> CharText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Slice by character offsets, clamping to the text length
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let last = self.char_len();
        let (start, end) = (start.min(last), end.min(last));
        if end <= start {
            return "";
        }
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}
