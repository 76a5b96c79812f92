//! Relation Extraction (RE) module
//!
//! Joins named entities whose syntactic roots depend on the same
//! governor token. "Lehrer interviewed Obama" links both entities through
//! "interviewed". Every qualifying pair yields one relation; there is no
//! ranking, scoring or deduplication.

use std::collections::HashMap;

use serde::Serialize;

use crate::offsets::CharText;
use crate::parsed::ParsedDoc;

// ============================================================================
// Records
// ============================================================================

/// Named entity as registered under its root token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub text: String,
    pub category: String,
    pub root_i: usize,
    pub root_text: String,
    pub kb_id: String,
}

/// Dependency link from a token to its governor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernorLink {
    pub dep: String,
    pub governor_text: String,
    pub governor_lemma: String,
    pub governor_i: usize,
}

/// Two entities sharing a governor
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRelation {
    pub governor: GovernorLink,
    pub e1: EntityRecord,
    pub e1_dep: String,
    pub e2: EntityRecord,
    pub e2_dep: String,
}

// ============================================================================
// Entity Registry
// ============================================================================

/// Entities keyed by root token index, in registration order.
///
/// Registering a second entity on the same root replaces the record but
/// keeps the original position.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: Vec<(usize, EntityRecord)>,
    index: HashMap<usize, usize>,
    governors: HashMap<usize, GovernorLink>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: EntityRecord) {
        let root = record.root_i;
        match self.index.get(&root) {
            Some(&pos) => self.entries[pos].1 = record,
            None => {
                self.index.insert(root, self.entries.len());
                self.entries.push((root, record));
            }
        }
    }

    pub fn contains(&self, root: usize) -> bool {
        self.index.contains_key(&root)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the governor of a registered root token
    pub fn set_governor(&mut self, root: usize, link: GovernorLink) {
        if self.contains(root) {
            self.governors.insert(root, link);
        }
    }

    /// Pair up entities (lower root index first) whose roots share a governor
    pub fn relations(&self) -> Vec<EntityRelation> {
        let mut relations = Vec::new();

        for (i1, e1) in &self.entries {
            for (i2, e2) in &self.entries {
                if i1 >= i2 {
                    continue;
                }
                let (Some(g1), Some(g2)) = (self.governors.get(i1), self.governors.get(i2)) else {
                    continue;
                };
                if g1.governor_i != g2.governor_i {
                    continue;
                }
                relations.push(EntityRelation {
                    governor: g1.clone(),
                    e1: e1.clone(),
                    e1_dep: g1.dep.clone(),
                    e2: e2.clone(),
                    e2_dep: g2.dep.clone(),
                });
            }
        }

        relations
    }
}

/// Governor link of token `i`, with the governor text sliced from `text`
pub fn governor_link(doc: &ParsedDoc, i: usize, text: &CharText<'_>) -> Option<GovernorLink> {
    let tok = doc.tokens.get(i)?;
    let head_i = doc.head_of(i);
    let head = &doc.tokens[head_i];
    Some(GovernorLink {
        dep: tok.dep.clone(),
        governor_text: text.slice(head.idx, head.end()).to_string(),
        governor_lemma: head.lemma.clone(),
        governor_i: head_i,
    })
}

// ============================================================================
// Tests
// ============================================================================
