//! MMIF document model
//!
//! A permissive serde model of the multi-media interchange format: the
//! fields this service reads or writes are typed, everything else is kept
//! in `extra` maps so that a round trip never drops input data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vocabulary::{is_text_document, MMIF_VERSION};
use crate::{NlpaError, Result};

/// Top-level MMIF container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mmif {
    pub metadata: MmifMetadata,

    #[serde(default)]
    pub documents: Vec<Document>,

    #[serde(default)]
    pub views: Vec<View>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmifMetadata {
    /// MMIF specification URI, e.g. `http://mmif.clams.ai/0.4.0`
    pub mmif: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MmifMetadata {
    fn default() -> Self {
        Self {
            mmif: format!("http://mmif.clams.ai/{MMIF_VERSION}"),
            extra: Map::new(),
        }
    }
}

/// A source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "@type")]
    pub at_type: String,

    pub properties: DocumentProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextValue>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inline text value of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(rename = "@value")]
    pub value: String,

    #[serde(
        rename = "@language",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub language: Option<String>,
}

/// Where a document's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Inline(String),
    Location(String),
}

impl Document {
    /// Create a text document holding inline text
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            at_type: crate::vocabulary::TEXT_DOCUMENT.to_string(),
            properties: DocumentProperties {
                id: id.into(),
                mime: None,
                location: None,
                text: Some(TextValue {
                    value: text.into(),
                    language: None,
                }),
                extra: Map::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.properties.id
    }

    pub fn is_text_document(&self) -> bool {
        is_text_document(&self.at_type)
    }

    /// The location takes precedence over an inline value
    pub fn text_source(&self) -> Option<TextSource> {
        if let Some(location) = self.properties.location.as_deref() {
            if !location.is_empty() {
                return Some(TextSource::Location(location.to_string()));
            }
        }
        self.properties
            .text
            .as_ref()
            .map(|t| TextSource::Inline(t.value.clone()))
    }
}

/// A view: one tool's annotations over one or more documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,

    #[serde(default)]
    pub metadata: ViewMetadata,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewMetadata {
    #[serde(default)]
    pub app: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub contains: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl View {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: ViewMetadata::default(),
            annotations: Vec::new(),
        }
    }

    /// Declare an annotation type, optionally bound to a document id
    pub fn new_contain(&mut self, at_type: &str, document: Option<&str>) {
        let mut contain = Map::new();
        if let Some(doc_id) = document {
            contain.insert("document".to_string(), Value::String(doc_id.to_string()));
        }
        self.metadata
            .contains
            .insert(at_type.to_string(), Value::Object(contain));
    }

    /// Stamp the view with the producing app and the current time
    pub fn sign(&mut self, app: &str) {
        self.metadata.app = app.to_string();
        self.metadata.timestamp = Some(
            chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        );
    }

    /// Append a new annotation and return it for property population
    pub fn new_annotation(&mut self, at_type: &str, id: impl Into<String>) -> &mut Annotation {
        self.annotations.push(Annotation::new(at_type, id));
        let last = self.annotations.len() - 1;
        &mut self.annotations[last]
    }

    /// Text documents embedded in this view as annotations
    pub fn text_documents(&self) -> Vec<Document> {
        self.annotations
            .iter()
            .filter(|a| is_text_document(&a.at_type))
            .filter_map(Annotation::to_document)
            .collect()
    }
}

/// A typed annotation with free-form properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "@type")]
    pub at_type: String,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Annotation {
    pub fn new(at_type: &str, id: impl Into<String>) -> Self {
        let mut properties = Map::new();
        properties.insert("id".to_string(), Value::String(id.into()));
        Self {
            at_type: at_type.to_string(),
            properties,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.properties.get("id").and_then(Value::as_str)
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Reinterpret a document-typed annotation as a `Document`
    pub fn to_document(&self) -> Option<Document> {
        let properties =
            serde_json::from_value::<DocumentProperties>(Value::Object(self.properties.clone()))
                .ok()?;
        Some(Document {
            at_type: self.at_type.clone(),
            properties,
        })
    }
}

impl Mmif {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            metadata: MmifMetadata::default(),
            documents,
            views: Vec::new(),
        }
    }

    /// Parse a serialized MMIF string
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| NlpaError::InvalidMmif(e.to_string()))
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let out = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(out)
    }

    /// Top-level text documents
    pub fn text_documents(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.is_text_document())
            .collect()
    }

    /// Next free view identifier of the form `v_<n>`
    pub fn new_view_id(&self) -> String {
        let mut index = self.views.len();
        loop {
            let candidate = format!("v_{index}");
            if !self.views.iter().any(|v| v.id == candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    /// Append an empty view and return it
    pub fn new_view(&mut self) -> &mut View {
        let id = self.new_view_id();
        self.views.push(View::new(id));
        let last = self.views.len() - 1;
        &mut self.views[last]
    }

    pub fn get_view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }
}
