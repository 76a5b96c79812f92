//! Annotation identifier generator
//!
//! Mints `<prefix><n>` identifiers with one counter per prefix. A fresh
//! generator is created for every top-level annotate call, so counters
//! restart at 1 for each batch and are never shared between requests.

use std::collections::HashMap;

/// Per-batch identifier counters keyed by type prefix
#[derive(Debug, Default, Clone)]
pub struct Identifiers {
    counters: HashMap<String, usize>,
}

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next identifier for `prefix`, starting at `<prefix>1`
    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    /// Number of identifiers minted so far for `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}
