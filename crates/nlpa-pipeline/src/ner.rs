//! Named Entity module
//!
//! Provides:
//! - Entity categories reported on NamedEntity annotations
//! - DBpedia Spotlight resource records and their type lookup
//! - Alignment of linked resources onto token spans

use serde::{Deserialize, Serialize};

use crate::offsets::OffsetTable;
use crate::parsed::EntitySpan;

/// Label given to entities produced by the linker
pub const LINKED_ENTITY_LABEL: &str = "DBPEDIA_ENT";

// ============================================================================
// Entity Categories
// ============================================================================

/// Entity categories reported on annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    Person,
    Place,
    Organisation,
    Device,
}

impl EntityCategory {
    /// Lookup order when several DBpedia types are present
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Person,
        EntityCategory::Place,
        EntityCategory::Organisation,
        EntityCategory::Device,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Organisation => "Organisation",
            Self::Device => "Device",
        }
    }

    /// First category whose `DBpedia:<Category>` occurs anywhere in a
    /// Spotlight `@types` string, so `DBpedia:PersonFunction` counts as a
    /// person. Checked in `ALL` order.
    pub fn from_dbpedia_types(types: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| types.contains(&format!("DBpedia:{}", category.as_str())))
    }

    /// Map an NER label from the parser's own model
    pub fn from_ner_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "PERSON" | "PER" => Some(Self::Person),
            "GPE" | "LOC" | "FAC" => Some(Self::Place),
            "ORG" => Some(Self::Organisation),
            "PRODUCT" => Some(Self::Device),
            _ => None,
        }
    }

    /// Category of a parsed entity: linked entities are typed by their
    /// DBpedia types, unlinked ones by their NER label. Missing or
    /// malformed linker metadata yields no category.
    pub fn of_entity(entity: &EntitySpan) -> Option<Self> {
        match &entity.resource {
            Some(resource) => resource.types.as_deref().and_then(Self::from_dbpedia_types),
            None if entity.label == LINKED_ENTITY_LABEL => None,
            None => Self::from_ner_label(&entity.label),
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Linked Resources
// ============================================================================

/// A DBpedia Spotlight resource as returned by its `annotate` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedResource {
    #[serde(rename = "@URI")]
    pub uri: String,

    #[serde(rename = "@support", default, skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,

    /// Comma-separated type list, e.g. `Schema:Person,DBpedia:Person`
    #[serde(rename = "@types", default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,

    #[serde(rename = "@surfaceForm")]
    pub surface_form: String,

    /// Character offset of the surface form in the submitted text
    #[serde(rename = "@offset")]
    pub offset: String,

    #[serde(
        rename = "@similarityScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub similarity_score: Option<String>,

    #[serde(
        rename = "@percentageOfSecondRank",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub percentage_of_second_rank: Option<String>,
}

impl LinkedResource {
    /// Character span of the surface form, if the offset parses
    pub fn char_span(&self) -> Option<(usize, usize)> {
        let start: usize = self.offset.trim().parse().ok()?;
        Some((start, start + self.surface_form.chars().count()))
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Turn linker resources into entity spans over the parsed tokens.
///
/// Resources whose surface form does not start and end on token
/// boundaries are dropped. Overlaps are resolved keeping the longest
/// span, then the earliest.
pub fn align_resources(table: &OffsetTable, resources: Vec<LinkedResource>) -> Vec<EntitySpan> {
    let mut candidates: Vec<EntitySpan> = Vec::new();

    for resource in resources {
        let Some((start, end)) = resource.char_span() else {
            tracing::debug!(offset = %resource.offset, "Unparseable linker offset");
            continue;
        };
        let Some(span) = table.char_span_to_tokens(start, end) else {
            tracing::debug!(
                surface = %resource.surface_form,
                start,
                end,
                "Linked resource not aligned to tokens"
            );
            continue;
        };
        candidates.push(EntitySpan {
            start: span.start,
            end: span.end,
            label: LINKED_ENTITY_LABEL.to_string(),
            kb_id: resource.uri.clone(),
            resource: Some(resource),
        });
    }

    filter_spans(candidates)
}

/// Remove overlapping entities, keeping longest then earliest
pub fn filter_spans(mut entities: Vec<EntitySpan>) -> Vec<EntitySpan> {
    entities.sort_by(|a, b| {
        b.span()
            .len()
            .cmp(&a.span().len())
            .then(a.start.cmp(&b.start))
    });

    let mut kept: Vec<EntitySpan> = Vec::new();
    for entity in entities {
        let span = entity.span();
        if !kept.iter().any(|k| k.span().overlaps(&span)) {
            kept.push(entity);
        }
    }

    kept.sort_by_key(|e| e.start);
    kept
}

// ============================================================================
// Tests
// ============================================================================
