use std::collections::BTreeMap;

use folio_core::collaborators::ContentTypeProvider;
use folio_core::errors::{FolioError, Result};
use folio_core::model::ContentType;
use folio_core_types::ContentTypeId;

#[derive(Debug)]
pub struct ContentTypeRegistry {
    types: BTreeMap<ContentTypeId, ContentType>,
    next_id: ContentTypeId,
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self {
            types: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ContentType> {
        self.types.values().cloned().collect()
    }
}

impl ContentTypeProvider for ContentTypeRegistry {
    fn get(&self, id: ContentTypeId) -> Result<ContentType> {
        self.types
            .get(&id)
            .cloned()
            .ok_or(FolioError::ContentTypeNotFound { content_type_id: id })
    }

    fn get_by_alias(&self, alias: &str) -> Result<ContentType> {
        self.types
            .values()
            .find(|t| t.alias == alias)
            .cloned()
            .ok_or_else(|| FolioError::ContentTypeAliasNotFound {
                alias: alias.to_string(),
            })
    }

    fn save(&mut self, mut content_type: ContentType) -> Result<ContentType> {
        let clash = self
            .types
            .values()
            .any(|t| t.alias == content_type.alias && t.id != content_type.id);
        if clash {
            return Err(FolioError::DuplicateContentTypeAlias {
                alias: content_type.alias,
            });
        }
        if content_type.id == 0 {
            content_type.id = self.next_id;
            self.next_id += 1;
        } else if !self.types.contains_key(&content_type.id) {
            return Err(FolioError::ContentTypeNotFound {
                content_type_id: content_type.id,
            });
        }
        self.types.insert(content_type.id, content_type.clone());
        Ok(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::model::ContentVariation;

    #[test]
    fn test_save_assigns_ids_and_rejects_duplicate_alias() {
        let mut registry = ContentTypeRegistry::new();
        let page = registry
            .save(ContentType::new("page", ContentVariation::Culture))
            .expect("Should save");
        assert_eq!(page.id, 1);
        assert_eq!(registry.get_by_alias("page").expect("Should find").id, 1);

        let result = registry.save(ContentType::new("page", ContentVariation::Nothing));
        assert!(matches!(
            result,
            Err(FolioError::DuplicateContentTypeAlias { .. })
        ));
    }
}
