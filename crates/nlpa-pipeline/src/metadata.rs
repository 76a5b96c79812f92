//! App metadata
//!
//! Describes this app to MMIF consumers: identity, versions, licenses and
//! the annotation types it reads and writes.

use nlpa_core::vocabulary::{self, MMIF_VERSION, OUTPUT_TYPES};
use serde::{Deserialize, Serialize};

pub const APP_IDENTIFIER: &str = "https://apps.clams.ai/spacy_nlp";

/// App metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub identifier: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub app_version: String,
    pub app_license: String,
    pub analyzer_version: String,
    pub analyzer_license: String,
    pub mmif_version: String,
    pub input: Vec<TypeSpec>,
    pub output: Vec<TypeSpec>,
}

/// An input or output annotation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    #[serde(rename = "@type")]
    pub at_type: String,
}

impl TypeSpec {
    fn of(at_type: &str) -> Self {
        Self {
            at_type: at_type.to_string(),
        }
    }
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            identifier: APP_IDENTIFIER.to_string(),
            url: "https://github.com/clamsproject/app-spacy-nlp".to_string(),
            name: "Spacy NLP".to_string(),
            description: "Apply spaCy NLP to all text documents in a MMIF file.".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            app_license: "Apache 2.0".to_string(),
            analyzer_version: "3.1.2".to_string(),
            analyzer_license: "MIT".to_string(),
            mmif_version: MMIF_VERSION.to_string(),
            input: vec![TypeSpec::of(vocabulary::TEXT_DOCUMENT)],
            output: OUTPUT_TYPES.iter().map(|t| TypeSpec::of(t)).collect(),
        }
    }
}
