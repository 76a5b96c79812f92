//! MMIF annotation orchestrator
//!
//! For every text document in a MMIF file: read its text, optionally
//! truecase it, parse it, link its entities, and write tokens, noun
//! chunks, sentences, named entities, dependencies and entity relations
//! into a new view.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;
use std::time::Duration;

use nlpa_core::config::DEFAULT_UNCASED_MODEL;
use nlpa_core::vocabulary::{
    DEPENDENCY, GENERIC_RELATION, NAMED_ENTITY, NOUN_CHUNK, OUTPUT_TYPES, SENTENCE, TOKEN,
};
use nlpa_core::{AppConfig, Document, Identifiers, Mmif, Result, View};
use serde_json::{json, Value};

use crate::fetch::DocumentFetcher;
use crate::metadata::AppMetadata;
use crate::ner::{align_resources, EntityCategory};
use crate::offsets::{CharText, OffsetTable};
use crate::parsed::ParsedDoc;
use crate::relation::{governor_link, EntityRecord, EntityRegistry};
use crate::remote::{RemoteParser, SpotlightLinker};
use crate::truecase::Truecaser;
use crate::{EntityLinker, NlpPipeline};

/// Runs the NLP pipeline over MMIF documents
pub struct Annotator {
    parser: Arc<dyn NlpPipeline>,
    linker: Option<Arc<dyn EntityLinker>>,
    truecaser: Option<Truecaser>,
    fetcher: DocumentFetcher,
    metadata: AppMetadata,
}

impl Annotator {
    /// Create an annotator that uses the parser's own entities
    pub fn new(parser: Arc<dyn NlpPipeline>) -> Self {
        Self {
            parser,
            linker: None,
            truecaser: None,
            fetcher: DocumentFetcher::new(),
            metadata: AppMetadata::default(),
        }
    }

    /// Take named entities from an entity linker instead of the parser
    pub fn with_linker(mut self, linker: Arc<dyn EntityLinker>) -> Self {
        self.linker = Some(linker);
        self
    }

    /// Use `fetcher` to read documents given by location
    pub fn with_fetcher(mut self, fetcher: DocumentFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Truecase input with an uncased NER model before parsing
    pub fn with_truecaser(mut self, truecaser: Truecaser) -> Self {
        self.truecaser = Some(truecaser);
        self
    }

    /// Build the remote pipeline described by `config`
    pub fn from_config(config: &AppConfig, uncased: bool) -> Result<Self> {
        config.validate()?;

        let parser = RemoteParser::from_config(&config.parser)?;
        let fetcher =
            DocumentFetcher::with_timeout(Duration::from_secs(config.parser.timeout_secs))?;
        let mut annotator = Self::new(Arc::new(parser)).with_fetcher(fetcher);

        if config.linker.enabled {
            let linker = SpotlightLinker::from_config(&config.linker)?;
            annotator = annotator.with_linker(Arc::new(linker));
        }

        if uncased {
            let model = config
                .parser
                .uncased_model
                .clone()
                .unwrap_or_else(|| DEFAULT_UNCASED_MODEL.to_string());
            let ner = RemoteParser::with_model(&config.parser, model)?;
            annotator = annotator.with_truecaser(Truecaser::new(Box::new(ner)));
        }

        Ok(annotator)
    }

    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    pub fn is_uncased(&self) -> bool {
        self.truecaser.is_some()
    }

    /// Annotate every text document, returning the MMIF with new views.
    ///
    /// Identifiers are numbered per call: each call starts again at `t1`,
    /// `nc1`, and so on.
    pub async fn annotate(&self, mut mmif: Mmif) -> Result<Mmif> {
        let mut ids = Identifiers::new();

        let top_level: Vec<Document> = mmif.text_documents().into_iter().cloned().collect();
        let in_views: Vec<(String, Vec<Document>)> = mmif
            .views
            .iter()
            .map(|v| (v.id.clone(), v.text_documents()))
            .filter(|(_, docs)| !docs.is_empty())
            .collect();

        tracing::info!(
            documents = top_level.len(),
            views_with_documents = in_views.len(),
            "Annotating MMIF"
        );

        for doc in &top_level {
            let mut view = self.new_view(&mmif, Some(doc.id()));
            self.add_tool_output(doc, &mut view, None, &mut ids).await?;
            mmif.views.push(view);
        }

        for (view_id, docs) in &in_views {
            let mut view = self.new_view(&mmif, None);
            for doc in docs {
                let doc_id = format!("{view_id}:{}", doc.id());
                self.add_tool_output(doc, &mut view, Some(&doc_id), &mut ids)
                    .await?;
            }
            mmif.views.push(view);
        }

        Ok(mmif)
    }

    fn new_view(&self, mmif: &Mmif, document: Option<&str>) -> View {
        let mut view = View::new(mmif.new_view_id());
        view.sign(&self.metadata.identifier);
        for at_type in OUTPUT_TYPES {
            view.new_contain(at_type, document);
        }
        view
    }

    async fn add_tool_output(
        &self,
        doc: &Document,
        view: &mut View,
        doc_id: Option<&str>,
        ids: &mut Identifiers,
    ) -> Result<()> {
        let text = match self.fetcher.read_text(doc).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::warn!(document = doc.id(), "Document has no text");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(document = doc.id(), error = %e, "Could not read document");
                return Ok(());
            }
        };

        let input_text = match &self.truecaser {
            Some(truecaser) => truecaser.truecase(&text).await?,
            None => text.clone(),
        };

        let mut parsed = self.parser.parse(&input_text).await?;
        let table = OffsetTable::new(&parsed);

        if let Some(linker) = &self.linker {
            let resources = linker.link(&input_text).await?;
            parsed.ents = align_resources(&table, resources);
        }

        let before = view.annotations.len();
        write_annotations(view, &parsed, &table, &text, doc_id, ids);

        tracing::debug!(
            document = doc.id(),
            model = self.parser.model(),
            annotations = view.annotations.len() - before,
            "Document annotated"
        );
        Ok(())
    }
}

/// Add an annotation with optional document reference and span
fn add_annotation(
    view: &mut View,
    at_type: &str,
    id: String,
    doc_id: Option<&str>,
    span: Option<(usize, usize)>,
    properties: Value,
) {
    let annotation = view.new_annotation(at_type, id);
    if let Some(doc_id) = doc_id {
        annotation.add_property("document", doc_id);
    }
    if let Some((start, end)) = span {
        annotation.add_property("start", start);
        annotation.add_property("end", end);
    }
    if let Value::Object(map) = properties {
        for (key, value) in map {
            annotation.add_property(key, value);
        }
    }
}

/// Map one parsed document into annotations on `view`.
///
/// Token, chunk, sentence and entity spans are character offsets into
/// `text`; text attributes are sliced from `text` as well. Units whose
/// token range is empty or out of bounds are skipped.
pub fn write_annotations(
    view: &mut View,
    parsed: &ParsedDoc,
    table: &OffsetTable,
    text: &str,
    doc_id: Option<&str>,
    ids: &mut Identifiers,
) {
    let chars = CharText::new(text);

    for (n, tok) in parsed.tokens.iter().enumerate() {
        let (p1, p2) = (tok.idx, tok.end());
        add_annotation(
            view,
            TOKEN,
            ids.next("t"),
            doc_id,
            Some((p1, p2)),
            json!({"pos": tok.tag, "lemma": tok.lemma, "text": chars.slice(p1, p2), "i": n}),
        );
    }

    for chunk in &parsed.noun_chunks {
        let Some((p1, p2)) = table.span(*chunk) else {
            tracing::warn!(start = chunk.start, end = chunk.end, "Skipping noun chunk with bad token range");
            continue;
        };
        add_annotation(
            view,
            NOUN_CHUNK,
            ids.next("nc"),
            doc_id,
            Some((p1, p2)),
            json!({"text": chars.slice(p1, p2)}),
        );
    }

    for sent in &parsed.sents {
        let Some((p1, p2)) = table.span(*sent) else {
            tracing::warn!(start = sent.start, end = sent.end, "Skipping sentence with bad token range");
            continue;
        };
        add_annotation(
            view,
            SENTENCE,
            ids.next("s"),
            doc_id,
            Some((p1, p2)),
            json!({"text": chars.slice(p1, p2)}),
        );
    }

    let mut registry = EntityRegistry::new();
    for ent in &parsed.ents {
        let Some(category) = EntityCategory::of_entity(ent) else {
            tracing::debug!(kb_id = %ent.kb_id, label = %ent.label, "Entity without category");
            continue;
        };
        let (Some((p1, p2)), Some(root)) = (table.span(ent.span()), parsed.span_root(ent.span()))
        else {
            tracing::warn!(start = ent.start, end = ent.end, "Skipping entity with bad token range");
            continue;
        };
        let (r1, r2) = table.token(root).unwrap_or((p1, p1));

        let record = EntityRecord {
            text: chars.slice(p1, p2).to_string(),
            category: category.to_string(),
            root_i: root,
            root_text: chars.slice(r1, r2).to_string(),
            kb_id: ent.kb_id.clone(),
        };
        add_annotation(
            view,
            NAMED_ENTITY,
            ids.next("ne"),
            doc_id,
            Some((p1, p2)),
            json!({
                "text": record.text,
                "category": record.category,
                "root_i": record.root_i,
                "root_text": record.root_text,
                "kb_id": record.kb_id,
            }),
        );
        registry.register(record);
    }

    for (n, tok) in parsed.tokens.iter().enumerate() {
        let Some(link) = governor_link(parsed, n, &chars) else {
            continue;
        };
        add_annotation(
            view,
            DEPENDENCY,
            ids.next("dep"),
            doc_id,
            None,
            json!({
                "dependent_text": chars.slice(tok.idx, tok.end()),
                "dependent_lemma": tok.lemma,
                "dependent_i": n,
                "dep": link.dep,
                "governer_text": link.governor_text,
                "governer_lemma": link.governor_lemma,
                "governer_i": link.governor_i,
            }),
        );
        registry.set_governor(n, link);
    }

    for relation in registry.relations() {
        add_annotation(
            view,
            GENERIC_RELATION,
            ids.next("rel"),
            doc_id,
            None,
            json!({
                "rel_text": relation.governor.governor_text,
                "rel_lemma": relation.governor.governor_lemma,
                "rel_i": relation.governor.governor_i,
                "e1_text": relation.e1.text,
                "e1_root_i": relation.e1.root_i,
                "e1_kb_id": relation.e1.kb_id,
                "e1_dep": relation.e1_dep,
                "e2_text": relation.e2.text,
                "e2_root_i": relation.e2.root_i,
                "e2_kb_id": relation.e2.kb_id,
                "e2_dep": relation.e2_dep,
            }),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed::{ParsedToken, TokenSpan};
    use crate::testing::{
        sample_doc, sample_resources, FailingPipeline, StaticLinker, StaticPipeline, SAMPLE_TEXT,
    };
    use nlpa_core::mmif::Annotation;
    use nlpa_core::NlpaError;

    fn annotator() -> Annotator {
        Annotator::new(Arc::new(StaticPipeline::new(sample_doc())))
            .with_linker(Arc::new(StaticLinker::new(sample_resources())))
    }

    fn of_type<'a>(view: &'a View, at_type: &str) -> Vec<&'a Annotation> {
        view.annotations
            .iter()
            .filter(|a| a.at_type == at_type)
            .collect()
    }

    #[tokio::test]
    async fn test_annotate_sample_document() {
        let mmif = Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]);
        let out = annotator().annotate(mmif).await.unwrap();

        assert_eq!(out.views.len(), 1);
        let view = &out.views[0];
        assert_eq!(view.id, "v_0");
        assert_eq!(view.metadata.app, crate::metadata::APP_IDENTIFIER);
        assert_eq!(view.metadata.contains.len(), 8);
        assert_eq!(view.metadata.contains[TOKEN]["document"], "m1");

        let tokens = of_type(view, TOKEN);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[2].id(), Some("t3"));
        assert_eq!(tokens[2].get("text"), Some(&json!("interviewed")));
        assert_eq!(tokens[2].get("lemma"), Some(&json!("interview")));
        assert_eq!(tokens[2].get("pos"), Some(&json!("VBD")));
        assert_eq!(tokens[2].get("start"), Some(&json!(11)));
        assert_eq!(tokens[2].get("end"), Some(&json!(22)));
        assert!(tokens[0].get("document").is_none());

        let chunks = of_type(view, NOUN_CHUNK);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].get("text"), Some(&json!("Jim Lehrer")));

        let sentences = of_type(view, SENTENCE);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].get("end"), Some(&json!(29)));

        let entities = of_type(view, NAMED_ENTITY);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id(), Some("ne1"));
        assert_eq!(entities[0].get("category"), Some(&json!("Person")));
        assert_eq!(entities[0].get("root_i"), Some(&json!(1)));
        assert_eq!(entities[0].get("root_text"), Some(&json!("Lehrer")));
        assert_eq!(
            entities[0].get("kb_id"),
            Some(&json!("http://dbpedia.org/resource/Jim_Lehrer"))
        );

        let deps = of_type(view, DEPENDENCY);
        assert_eq!(deps.len(), 5);
        assert!(deps[0].get("start").is_none());
        assert_eq!(deps[0].get("governer_text"), Some(&json!("Lehrer")));
        assert_eq!(deps[2].get("governer_i"), Some(&json!(2)));

        let relations = of_type(view, GENERIC_RELATION);
        assert_eq!(relations.len(), 1);
        let rel = relations[0];
        assert_eq!(rel.id(), Some("rel1"));
        assert_eq!(rel.get("rel_lemma"), Some(&json!("interview")));
        assert_eq!(rel.get("e1_text"), Some(&json!("Jim Lehrer")));
        assert_eq!(rel.get("e1_dep"), Some(&json!("nsubj")));
        assert_eq!(rel.get("e2_text"), Some(&json!("Obama")));
        assert_eq!(rel.get("e2_dep"), Some(&json!("dobj")));
        assert_eq!(
            rel.get("e2_kb_id"),
            Some(&json!("http://dbpedia.org/resource/Barack_Obama"))
        );
    }

    #[tokio::test]
    async fn test_identifiers_reset_per_call() {
        let annotator = annotator();
        let mmif = Mmif::new(vec![
            Document::text("m1", SAMPLE_TEXT),
            Document::text("m2", SAMPLE_TEXT),
        ]);

        let first = annotator.annotate(mmif.clone()).await.unwrap();
        // second document continues the numbering within the batch
        assert_eq!(first.views[1].annotations[0].id(), Some("t6"));

        let second = annotator.annotate(mmif).await.unwrap();
        assert_eq!(second.views[0].annotations[0].id(), Some("t1"));
    }

    #[tokio::test]
    async fn test_documents_inside_views() {
        let mut mmif = Mmif::new(Vec::new());
        let mut asr = View::new("v_0");
        let doc = Document::text("td1", SAMPLE_TEXT);
        asr.annotations.push(Annotation {
            at_type: doc.at_type.clone(),
            properties: serde_json::to_value(&doc.properties)
                .unwrap()
                .as_object()
                .cloned()
                .unwrap(),
        });
        mmif.views.push(asr);

        let out = annotator().annotate(mmif).await.unwrap();
        assert_eq!(out.views.len(), 2);
        let view = &out.views[1];
        assert_eq!(view.id, "v_1");
        assert_eq!(view.metadata.contains[TOKEN], json!({}));
        assert_eq!(
            view.annotations[0].get("document"),
            Some(&json!("v_0:td1"))
        );
    }

    #[tokio::test]
    async fn test_parser_entities_without_linker() {
        let annotator = Annotator::new(Arc::new(StaticPipeline::new(sample_doc())));
        let out = annotator
            .annotate(Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]))
            .await
            .unwrap();

        let entities = of_type(&out.views[0], NAMED_ENTITY);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].get("text"), Some(&json!("Obama")));
        assert_eq!(entities[1].get("kb_id"), Some(&json!("")));
        assert_eq!(of_type(&out.views[0], GENERIC_RELATION).len(), 1);
    }

    #[tokio::test]
    async fn test_untyped_linked_entities_are_skipped() {
        let mut resources = sample_resources();
        resources[1].types = None;
        let annotator = Annotator::new(Arc::new(StaticPipeline::new(sample_doc())))
            .with_linker(Arc::new(StaticLinker::new(resources)));

        let out = annotator
            .annotate(Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]))
            .await
            .unwrap();
        assert_eq!(of_type(&out.views[0], NAMED_ENTITY).len(), 1);
        assert!(of_type(&out.views[0], GENERIC_RELATION).is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_document_yields_empty_view() {
        let mut doc = Document::text("m1", "");
        doc.properties.location = Some("file:///nonexistent/transcript.txt".to_string());

        let out = annotator().annotate(Mmif::new(vec![doc])).await.unwrap();
        assert_eq!(out.views.len(), 1);
        assert!(out.views[0].annotations.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_failure_propagates() {
        let annotator = Annotator::new(Arc::new(FailingPipeline));
        let err = annotator
            .annotate(Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]))
            .await
            .unwrap_err();
        assert!(matches!(err, NlpaError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_uncased_text_keeps_original_slices() {
        let mut ner_doc = sample_doc();
        ner_doc.tokens[0].ent_type = "PER".to_string();
        ner_doc.tokens[1].ent_type = "PER".to_string();

        let ner = StaticPipeline::new(ner_doc);
        let parser = Arc::new(StaticPipeline::new(sample_doc()));
        let linker = Arc::new(StaticLinker::new(sample_resources()));
        let annotator = Annotator::new(parser.clone())
            .with_linker(linker.clone())
            .with_truecaser(Truecaser::new(Box::new(ner)));
        assert!(annotator.is_uncased());

        let lower = SAMPLE_TEXT.to_lowercase();
        let out = annotator
            .annotate(Mmif::new(vec![Document::text("m1", lower)]))
            .await
            .unwrap();

        // parser and linker see the truecased text
        let truecased = "Jim Lehrer interviewed obama.".to_string();
        assert_eq!(parser.received(), vec![truecased.clone()]);
        assert_eq!(linker.received(), vec![truecased]);

        // annotation text is sliced from the document as given
        let tokens = of_type(&out.views[0], TOKEN);
        assert_eq!(tokens[0].get("text"), Some(&json!("jim")));
        let entities = of_type(&out.views[0], NAMED_ENTITY);
        assert_eq!(entities[0].get("text"), Some(&json!("jim lehrer")));
    }

    #[tokio::test]
    async fn test_cased_text_passes_through() {
        let parser = Arc::new(StaticPipeline::new(sample_doc()));
        let annotator = Annotator::new(parser.clone());

        annotator
            .annotate(Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]))
            .await
            .unwrap();
        assert_eq!(parser.received(), vec![SAMPLE_TEXT.to_string()]);
    }

    #[test]
    fn test_bad_ranges_are_skipped() {
        let mut doc = sample_doc();
        doc.noun_chunks.push(TokenSpan::new(4, 4));
        doc.sents.push(TokenSpan::new(3, 9));

        let table = OffsetTable::new(&doc);
        let mut view = View::new("v_0");
        let mut ids = Identifiers::new();
        write_annotations(&mut view, &doc, &table, SAMPLE_TEXT, None, &mut ids);

        assert_eq!(of_type(&view, NOUN_CHUNK).len(), 2);
        assert_eq!(of_type(&view, SENTENCE).len(), 1);
        assert_eq!(ids.count("nc"), 2);
    }

    #[test]
    fn test_character_offsets_with_multibyte_text() {
        let text = "Café Müller closed.";
        let tok = |idx: usize, text: &str, head: usize| ParsedToken {
            idx,
            text: text.to_string(),
            head,
            ..Default::default()
        };
        let doc = ParsedDoc {
            tokens: vec![tok(0, "Café", 1), tok(5, "Müller", 2), tok(12, "closed", 2), tok(18, ".", 2)],
            sents: vec![TokenSpan::new(0, 4)],
            ..Default::default()
        };

        let table = OffsetTable::new(&doc);
        let mut view = View::new("v_0");
        let mut ids = Identifiers::new();
        write_annotations(&mut view, &doc, &table, text, Some("v_0:td1"), &mut ids);

        let tokens = of_type(&view, TOKEN);
        assert_eq!(tokens[1].get("text"), Some(&json!("Müller")));
        assert_eq!(tokens[1].get("end"), Some(&json!(11)));
        assert_eq!(tokens[1].get("document"), Some(&json!("v_0:td1")));

        let sentences = of_type(&view, SENTENCE);
        assert_eq!(sentences[0].get("text"), Some(&json!(text)));
    }
}
