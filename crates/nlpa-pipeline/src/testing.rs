//! In-memory pipeline and linker for tests

use std::sync::Mutex;

use async_trait::async_trait;
use nlpa_core::{NlpaError, Result};

use crate::ner::LinkedResource;
use crate::parsed::{EntitySpan, ParsedDoc, ParsedToken, TokenSpan};
use crate::{EntityLinker, NlpPipeline};

fn record(received: &Mutex<Vec<String>>, text: &str) {
    if let Ok(mut texts) = received.lock() {
        texts.push(text.to_string());
    }
}

fn recorded(received: &Mutex<Vec<String>>) -> Vec<String> {
    received.lock().map(|t| t.clone()).unwrap_or_default()
}

/// Returns the same parse for every text and records what it was given
pub struct StaticPipeline {
    doc: ParsedDoc,
    model: String,
    received: Mutex<Vec<String>>,
}

impl StaticPipeline {
    pub fn new(doc: ParsedDoc) -> Self {
        Self {
            doc,
            model: "static".to_string(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Texts passed to `parse`, in call order
    pub fn received(&self) -> Vec<String> {
        recorded(&self.received)
    }
}

#[async_trait]
impl NlpPipeline for StaticPipeline {
    async fn parse(&self, text: &str) -> Result<ParsedDoc> {
        record(&self.received, text);
        Ok(self.doc.clone())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Always fails, as an unreachable parser service would
pub struct FailingPipeline;

#[async_trait]
impl NlpPipeline for FailingPipeline {
    async fn parse(&self, _text: &str) -> Result<ParsedDoc> {
        Err(NlpaError::Pipeline("parser unavailable".to_string()))
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Returns the same resources for every text and records what it was given
pub struct StaticLinker {
    resources: Vec<LinkedResource>,
    received: Mutex<Vec<String>>,
}

impl StaticLinker {
    pub fn new(resources: Vec<LinkedResource>) -> Self {
        Self {
            resources,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Texts passed to `link`, in call order
    pub fn received(&self) -> Vec<String> {
        recorded(&self.received)
    }
}

#[async_trait]
impl EntityLinker for StaticLinker {
    async fn link(&self, text: &str) -> Result<Vec<LinkedResource>> {
        record(&self.received, text);
        Ok(self.resources.clone())
    }
}

/// Text of the sample parse
pub const SAMPLE_TEXT: &str = "Jim Lehrer interviewed Obama.";

fn token(idx: usize, text: &str, tag: &str, lemma: &str, dep: &str, head: usize) -> ParsedToken {
    ParsedToken {
        idx,
        text: text.to_string(),
        tag: tag.to_string(),
        lemma: lemma.to_string(),
        dep: dep.to_string(),
        head,
        ent_type: String::new(),
    }
}

/// Parse of [`SAMPLE_TEXT`]: both entity roots hang off "interviewed"
pub fn sample_doc() -> ParsedDoc {
    ParsedDoc {
        tokens: vec![
            token(0, "Jim", "NNP", "Jim", "compound", 1),
            token(4, "Lehrer", "NNP", "Lehrer", "nsubj", 2),
            token(11, "interviewed", "VBD", "interview", "ROOT", 2),
            token(23, "Obama", "NNP", "Obama", "dobj", 2),
            token(28, ".", ".", ".", "punct", 2),
        ],
        noun_chunks: vec![TokenSpan::new(0, 2), TokenSpan::new(3, 4)],
        sents: vec![TokenSpan::new(0, 5)],
        ents: vec![
            EntitySpan {
                start: 0,
                end: 2,
                label: "PERSON".to_string(),
                kb_id: String::new(),
                resource: None,
            },
            EntitySpan {
                start: 3,
                end: 4,
                label: "PERSON".to_string(),
                kb_id: String::new(),
                resource: None,
            },
        ],
    }
}

fn resource(uri: &str, surface: &str, offset: usize, types: &str) -> LinkedResource {
    LinkedResource {
        uri: uri.to_string(),
        support: Some("100".to_string()),
        types: Some(types.to_string()),
        surface_form: surface.to_string(),
        offset: offset.to_string(),
        similarity_score: Some("1.0".to_string()),
        percentage_of_second_rank: Some("0.0".to_string()),
    }
}

/// Spotlight resources for [`SAMPLE_TEXT`]
pub fn sample_resources() -> Vec<LinkedResource> {
    vec![
        resource(
            "http://dbpedia.org/resource/Jim_Lehrer",
            "Jim Lehrer",
            0,
            "Http://xmlns.com/foaf/0.1/Person,Wikidata:Q5,DBpedia:Agent,DBpedia:Person",
        ),
        resource(
            "http://dbpedia.org/resource/Barack_Obama",
            "Obama",
            23,
            "Schema:Person,DBpedia:Agent,DBpedia:Person",
        ),
    ]
}
