//! NLPA Pipeline - NLP annotation pipeline
//!
//! Runs text through an external NLP parser and entity linker, aligns
//! their output to character offsets, derives entity relations from the
//! dependency parse, and writes everything into MMIF views.

use async_trait::async_trait;
use nlpa_core::Result;

pub mod annotator;
pub mod fetch;
pub mod metadata;
pub mod ner;
pub mod offsets;
pub mod parsed;
pub mod relation;
pub mod remote;
pub mod truecase;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use annotator::Annotator;
pub use metadata::AppMetadata;
pub use ner::{EntityCategory, LinkedResource};
pub use offsets::OffsetTable;
pub use parsed::{EntitySpan, ParsedDoc, ParsedToken, TokenSpan};
pub use remote::{RemoteParser, SpotlightLinker};

/// Trait for NLP parsers (tokens, tags, lemmas, chunks, sentences, NER, dependencies)
#[async_trait]
pub trait NlpPipeline: Send + Sync {
    /// Parse `text` into tokens and token-indexed spans
    async fn parse(&self, text: &str) -> Result<ParsedDoc>;

    /// Model name, used in logs
    fn model(&self) -> &str;
}

/// Trait for entity linkers
#[async_trait]
pub trait EntityLinker: Send + Sync {
    /// Find knowledge-base resources mentioned in `text`
    async fn link(&self, text: &str) -> Result<Vec<LinkedResource>>;
}
