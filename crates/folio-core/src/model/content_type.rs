use folio_core_types::ContentTypeId;
use serde::{Deserialize, Serialize};

use super::ContentVariation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    pub alias: String,
    pub variation: ContentVariation,
    /// A mandatory property must hold a non-empty value to publish
    pub mandatory: bool,
}

impl PropertyType {
    pub fn new(alias: impl Into<String>, variation: ContentVariation) -> Self {
        Self {
            alias: alias.into(),
            variation,
            mandatory: false,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

/// Document schema: variation settings and property types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: ContentTypeId,
    pub alias: String,
    pub variation: ContentVariation,
    pub property_types: Vec<PropertyType>,
}

impl ContentType {
    pub fn new(alias: impl Into<String>, variation: ContentVariation) -> Self {
        Self {
            id: 0,
            alias: alias.into(),
            variation,
            property_types: Vec::new(),
        }
    }

    pub fn with_property(mut self, property_type: PropertyType) -> Self {
        self.property_types.push(property_type);
        self
    }

    pub fn varies_by_culture(&self) -> bool {
        self.variation.varies_by_culture()
    }

    pub fn property_type(&self, alias: &str) -> Option<&PropertyType> {
        self.property_types.iter().find(|p| p.alias == alias)
    }

    /// Variation a property actually gets on documents of this type
    pub fn effective_variation(&self, property_type: &PropertyType) -> ContentVariation {
        property_type.variation & self.variation
    }

    pub fn property_variation(&self, alias: &str) -> Option<ContentVariation> {
        self.property_type(alias)
            .map(|p| self.effective_variation(p))
    }
}
