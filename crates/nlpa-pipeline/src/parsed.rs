//! Parsed document model
//!
//! The shape an NLP parser hands back: tokens with character offsets and
//! dependency heads, and token-index spans for noun chunks, sentences
//! and entities.

use serde::{Deserialize, Serialize};

use crate::ner::LinkedResource;

/// A parsed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDoc {
    pub tokens: Vec<ParsedToken>,

    #[serde(default)]
    pub noun_chunks: Vec<TokenSpan>,

    #[serde(default)]
    pub sents: Vec<TokenSpan>,

    #[serde(default)]
    pub ents: Vec<EntitySpan>,
}

/// A single token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedToken {
    /// Character offset of the first character
    pub idx: usize,
    pub text: String,
    /// Fine-grained part-of-speech tag
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub lemma: String,
    /// Dependency label towards `head`
    #[serde(default)]
    pub dep: String,
    /// Governor token index; a root token is its own head
    pub head: usize,
    /// Entity type assigned by the NER, empty outside entities
    #[serde(default)]
    pub ent_type: String,
}

impl ParsedToken {
    /// Exclusive character end offset
    pub fn end(&self) -> usize {
        self.idx + self.text.chars().count()
    }
}

/// Half-open token-index range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, i: usize) -> bool {
        self.start <= i && i < self.end
    }

    pub fn overlaps(&self, other: &TokenSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A named entity over a token range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub label: String,
    /// Knowledge-base identifier, empty when unlinked
    #[serde(default)]
    pub kb_id: String,
    /// Raw linker record this entity came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<LinkedResource>,
}

impl EntitySpan {
    pub fn span(&self) -> TokenSpan {
        TokenSpan::new(self.start, self.end)
    }
}

impl ParsedDoc {
    /// Syntactic root of a token span.
    ///
    /// Among the tokens whose head lies outside the span (or is the token
    /// itself), picks the one closest to its sentence root; ties go to the
    /// leftmost. `None` for empty or out-of-range spans.
    pub fn span_root(&self, span: TokenSpan) -> Option<usize> {
        if span.is_empty() || span.end > self.tokens.len() {
            return None;
        }
        (span.start..span.end)
            .filter(|&i| {
                let head = self.head_of(i);
                head == i || !span.contains(head)
            })
            .min_by_key(|&i| self.depth(i))
    }

    /// Number of head links from token `i` up to its sentence root.
    /// Cyclic head chains stop after visiting every token once.
    pub fn depth(&self, i: usize) -> usize {
        let mut depth = 0;
        let mut current = i;
        while depth < self.tokens.len() {
            let head = self.head_of(current);
            if head == current {
                break;
            }
            current = head;
            depth += 1;
        }
        depth
    }

    /// Head token of token `i`, falling back to the token itself when the
    /// parser reported an out-of-range head
    pub fn head_of(&self, i: usize) -> usize {
        match self.tokens.get(i) {
            Some(tok) if tok.head < self.tokens.len() => tok.head,
            _ => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(idx: usize, text: &str, head: usize) -> ParsedToken {
        ParsedToken {
            idx,
            text: text.to_string(),
            head,
            ..Default::default()
        }
    }

    #[test]
    fn test_token_end_counts_chars() {
        assert_eq!(token(3, "café", 0).end(), 7);
    }

    #[test]
    fn test_span_root() {
        // "New York Times reported" : New->Times, York->Times, Times->reported
        let doc = ParsedDoc {
            tokens: vec![
                token(0, "New", 2),
                token(4, "York", 2),
                token(9, "Times", 3),
                token(15, "reported", 3),
            ],
            ..Default::default()
        };
        assert_eq!(doc.span_root(TokenSpan::new(0, 3)), Some(2));
        assert_eq!(doc.span_root(TokenSpan::new(3, 4)), Some(3));
        assert_eq!(doc.span_root(TokenSpan::new(2, 2)), None);
        assert_eq!(doc.span_root(TokenSpan::new(2, 9)), None);
    }

    #[test]
    fn test_span_root_prefers_shallowest_token() {
        // 0 -> 2 -> 3 (root), 1 -> 3: both 0 and 1 leave the span [0, 2)
        let doc = ParsedDoc {
            tokens: vec![
                token(0, "a", 2),
                token(2, "b", 3),
                token(4, "c", 3),
                token(6, "d", 3),
            ],
            ..Default::default()
        };
        assert_eq!(doc.depth(0), 2);
        assert_eq!(doc.depth(1), 1);
        assert_eq!(doc.depth(3), 0);
        assert_eq!(doc.span_root(TokenSpan::new(0, 2)), Some(1));
        // equal depth: leftmost wins
        assert_eq!(doc.span_root(TokenSpan::new(1, 3)), Some(1));
    }

    #[test]
    fn test_depth_stops_on_cycle() {
        let doc = ParsedDoc {
            tokens: vec![token(0, "a", 1), token(2, "b", 0)],
            ..Default::default()
        };
        assert_eq!(doc.depth(0), 2);
        assert_eq!(doc.span_root(TokenSpan::new(0, 1)), Some(0));
    }

    #[test]
    fn test_head_of_out_of_range() {
        let doc = ParsedDoc {
            tokens: vec![token(0, "Hi", 7)],
            ..Default::default()
        };
        assert_eq!(doc.head_of(0), 0);
    }

    #[test]
    fn test_deserialize_minimal() {
        let doc: ParsedDoc = serde_json::from_str(
            r#"{"tokens": [{"idx": 0, "text": "Hi", "head": 0}]}"#,
        )
        .unwrap();
        assert_eq!(doc.tokens.len(), 1);
        assert!(doc.sents.is_empty());
        assert!(doc.tokens[0].ent_type.is_empty());
    }
}
