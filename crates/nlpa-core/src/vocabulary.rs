//! Annotation type vocabulary
//!
//! LAPPS Grid URIs for the annotation layers this service produces, plus
//! the MMIF document type it consumes.

pub const MMIF_VERSION: &str = "0.4.0";

pub const TEXT_DOCUMENT: &str = "http://mmif.clams.ai/0.4.0/vocabulary/TextDocument";

pub const TOKEN: &str = "http://vocab.lappsgrid.org/Token";
pub const POS: &str = "http://vocab.lappsgrid.org/Token#pos";
pub const LEMMA: &str = "http://vocab.lappsgrid.org/Token#lemma";
pub const NOUN_CHUNK: &str = "http://vocab.lappsgrid.org/NounChunk";
pub const SENTENCE: &str = "http://vocab.lappsgrid.org/Sentence";
pub const NAMED_ENTITY: &str = "http://vocab.lappsgrid.org/NamedEntity";
pub const DEPENDENCY: &str = "http://vocab.lappsgrid.org/Dependency";
pub const GENERIC_RELATION: &str = "http://vocab.lappsgrid.org/GenericRelation";

/// Every annotation type a new view declares in its `contains` metadata
pub const OUTPUT_TYPES: [&str; 8] = [
    TOKEN,
    POS,
    LEMMA,
    NOUN_CHUNK,
    SENTENCE,
    NAMED_ENTITY,
    DEPENDENCY,
    GENERIC_RELATION,
];

/// Whether an `@type` names a text document, across MMIF vocabulary versions
pub fn is_text_document(at_type: &str) -> bool {
    at_type.ends_with("TextDocument")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_document_detection() {
        assert!(is_text_document(TEXT_DOCUMENT));
        assert!(is_text_document(
            "http://mmif.clams.ai/0.2.1/vocabulary/TextDocument"
        ));
        assert!(!is_text_document(
            "http://mmif.clams.ai/0.4.0/vocabulary/VideoDocument"
        ));
    }
}
