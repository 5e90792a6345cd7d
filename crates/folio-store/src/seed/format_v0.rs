//! Seed Format v0 schema
//!
//! ```yaml
//! schema_version: 0
//! languages:
//!   - { iso_code: en-US, name: English (United States), is_default: true, is_mandatory: true }
//!   - { iso_code: fr-FR, name: French (France) }
//! content_types:
//!   - alias: page
//!     variation: culture
//!     properties:
//!       - { alias: title, variation: culture, mandatory: true }
//! documents:
//!   - type: page
//!     names: { en-US: Home, fr-FR: Accueil }
//!     values:
//!       - { alias: title, culture: en-US, value: Welcome }
//!     publish: true
//!     children: []
//! ```

use std::collections::BTreeMap;

use folio_core::model::ContentVariation;
use folio_core::settings::LanguageSettings;
use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Replaces the configured languages when present
    #[serde(default)]
    pub languages: Vec<LanguageSettings>,

    #[serde(default)]
    pub content_types: Vec<SeedContentType>,

    /// Top-level documents, each with its subtree
    #[serde(default)]
    pub documents: Vec<SeedDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedContentType {
    pub alias: String,
    #[serde(default)]
    pub variation: ContentVariation,
    #[serde(default)]
    pub properties: Vec<SeedProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProperty {
    pub alias: String,
    #[serde(default)]
    pub variation: ContentVariation,
    #[serde(default)]
    pub mandatory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDocument {
    /// Content type alias
    #[serde(rename = "type")]
    pub content_type: String,

    /// Invariant name; variant documents use `names`
    #[serde(default)]
    pub name: Option<String>,

    /// Culture names of a variant document
    #[serde(default)]
    pub names: BTreeMap<String, String>,

    #[serde(default)]
    pub values: Vec<SeedValue>,

    /// Publish every named culture after saving
    #[serde(default)]
    pub publish: bool,

    #[serde(default)]
    pub children: Vec<SeedDocument>,
}

impl SeedDocument {
    /// Name shown for the document: the invariant name, else the first culture name
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.names.values().next().map(String::as_str))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedValue {
    pub alias: String,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    pub value: serde_json::Value,
}
