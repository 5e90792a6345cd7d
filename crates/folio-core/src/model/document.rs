//! The versioned document
//!
//! A `Document` is one tagged value for both invariant and culture-variant
//! content; `variation` says which one it is. Draft and published state live
//! side by side in the property slots and culture infos. `history` is the
//! append-only log of frozen versions and `current_version_id` points at the
//! version being edited.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use folio_core_types::{ContentTypeId, DocumentId, VersionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::culture::{canonical_culture, WILDCARD};
use super::{
    ContentNode, ContentType, ContentVariation, CultureInfos, Property, ValueScope, Version,
    VersionSnapshot,
};
use crate::errors::{FolioError, Result};

/// Persisted publish state plus the two transient "pending" states set by
/// publish/unpublish marks before a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishedState {
    Published,
    Unpublished,
    Publishing,
    Unpublishing,
}

/// Cultures marked for publishing or unpublishing, awaiting a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub publishing: BTreeSet<String>,
    pub unpublishing: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub node: ContentNode,
    pub content_type_id: ContentTypeId,
    pub variation: ContentVariation,
    /// Invariant name; derived from the default culture on variant documents
    pub name: Option<String>,
    pub publish_name: Option<String>,
    pub cultures: CultureInfos,
    properties: BTreeMap<String, Property>,
    pub published: bool,
    pub edited: bool,
    state: PublishedState,
    pending: PendingChanges,
    pub current_version_id: VersionId,
    pub published_version_id: Option<VersionId>,
    pub history: Vec<Version>,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub publish_date: Option<DateTime<Utc>>,
}

impl Document {
    /// A new, unsaved document of `content_type` under `parent_id`
    pub fn new(content_type: &ContentType, parent_id: DocumentId, name: &str) -> Self {
        let now = Utc::now();
        let properties = content_type
            .property_types
            .iter()
            .map(|pt| {
                (
                    pt.alias.clone(),
                    Property::new(pt.alias.clone(), content_type.effective_variation(pt)),
                )
            })
            .collect();
        Self {
            node: ContentNode::new(parent_id),
            content_type_id: content_type.id,
            variation: content_type.variation,
            name: Some(name.to_string()).filter(|n| !n.is_empty()),
            publish_name: None,
            cultures: CultureInfos::new(),
            properties,
            published: false,
            edited: true,
            state: PublishedState::Unpublished,
            pending: PendingChanges::default(),
            current_version_id: VersionId::new(),
            published_version_id: None,
            history: Vec::new(),
            create_date: now,
            update_date: now,
            publish_date: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.node.id
    }

    pub fn parent_id(&self) -> DocumentId {
        self.node.parent_id
    }

    pub fn has_identity(&self) -> bool {
        self.node.has_identity()
    }

    pub fn trashed(&self) -> bool {
        self.node.trashed
    }

    pub fn varies_by_culture(&self) -> bool {
        self.variation.varies_by_culture()
    }

    // ===== Names =====

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string()).filter(|n| !n.is_empty());
    }

    /// # Errors
    ///
    /// `CultureNotSupported` on invariant documents, `InvalidCulture` for a
    /// malformed code.
    pub fn set_culture_name(&mut self, name: &str, culture: &str) -> Result<()> {
        let culture = self.require_variant_culture(culture)?;
        self.cultures.set_name(&culture, name, Utc::now());
        Ok(())
    }

    pub fn culture_name(&self, culture: &str) -> Option<&str> {
        self.cultures
            .get(&culture.to_lowercase())
            .map(|c| c.name.as_str())
    }

    pub fn is_culture_published(&self, culture: &str) -> bool {
        self.cultures.is_published(&culture.to_lowercase())
    }

    pub fn is_culture_edited(&self, culture: &str) -> bool {
        self.cultures.is_edited(&culture.to_lowercase())
    }

    pub fn is_culture_available(&self, culture: &str) -> bool {
        self.cultures.is_available(&culture.to_lowercase())
    }

    fn require_variant_culture(&self, culture: &str) -> Result<String> {
        if !self.varies_by_culture() {
            return Err(FolioError::CultureNotSupported {
                document_id: self.id(),
                culture: culture.to_string(),
            });
        }
        canonical_culture(culture)
    }

    // ===== Values =====

    pub fn property(&self, alias: &str) -> Option<&Property> {
        self.properties.get(alias)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub(crate) fn properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.properties.values_mut()
    }

    pub(crate) fn insert_property(&mut self, property: Property) {
        self.properties.insert(property.alias.clone(), property);
    }

    pub(crate) fn remove_property(&mut self, alias: &str) -> Option<Property> {
        self.properties.remove(alias)
    }

    pub fn get_value(
        &self,
        alias: &str,
        culture: Option<&str>,
        segment: Option<&str>,
        published: bool,
    ) -> Option<&Value> {
        let culture = culture.map(str::to_lowercase);
        self.properties
            .get(alias)?
            .get_value(culture.as_deref(), segment, published)
    }

    /// # Errors
    ///
    /// `PropertyNotFound` for an unknown alias, `VariationNotSupported` when
    /// the slot does not match the property variation.
    pub fn set_value(
        &mut self,
        alias: &str,
        value: Value,
        culture: Option<&str>,
        segment: Option<&str>,
    ) -> Result<()> {
        let culture = culture.map(canonical_culture).transpose()?;
        let document_id = self.id();
        let property =
            self.properties
                .get_mut(alias)
                .ok_or_else(|| FolioError::PropertyNotFound {
                    document_id,
                    alias: alias.to_string(),
                })?;
        property.set_value(Some(value), culture.as_deref(), segment)
    }

    // ===== Publish marks =====

    pub fn published_state(&self) -> PublishedState {
        self.state
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn has_pending_marks(&self) -> bool {
        matches!(
            self.state,
            PublishedState::Publishing | PublishedState::Unpublishing
        )
    }

    /// Mark a culture (or `"*"`) for publishing at the next commit
    ///
    /// Invariant documents only accept `"*"`. On a variant document `"*"`
    /// marks every available culture.
    ///
    /// # Errors
    ///
    /// `CultureNotSupported`, `InvalidCulture`, or `IllegalState` when the
    /// document is already marked for a whole-document unpublish.
    pub fn publish_culture(&mut self, culture: &str) -> Result<()> {
        if self.state == PublishedState::Unpublishing {
            return Err(self.illegal("publish", "document is marked for unpublishing"));
        }
        if culture.trim() == WILDCARD {
            if self.varies_by_culture() {
                for c in self.cultures.available() {
                    self.pending.unpublishing.remove(&c);
                    self.pending.publishing.insert(c);
                }
            }
        } else {
            let culture = self.require_variant_culture(culture)?;
            self.pending.unpublishing.remove(&culture);
            self.pending.publishing.insert(culture);
        }
        self.state = PublishedState::Publishing;
        Ok(())
    }

    /// Mark one culture of a variant document for unpublishing
    ///
    /// Returns `false` when the culture was not published, in which case
    /// nothing is marked for it.
    ///
    /// # Errors
    ///
    /// `CultureNotSupported` on invariant documents, `InvalidCulture` for the
    /// wildcard (use `mark_unpublishing`) or a malformed code.
    pub fn unpublish_culture(&mut self, culture: &str) -> Result<bool> {
        if self.state == PublishedState::Unpublishing {
            return Err(self.illegal("unpublish", "document is marked for unpublishing"));
        }
        let culture = self.require_variant_culture(culture)?;
        self.pending.publishing.remove(&culture);
        let removed = self.cultures.is_published(&culture);
        if removed {
            self.pending.unpublishing.insert(culture);
        }
        self.state = PublishedState::Publishing;
        Ok(removed)
    }

    /// Mark the whole document for unpublishing; culture flags stay as they are
    pub fn mark_unpublishing(&mut self) {
        self.pending = PendingChanges::default();
        self.state = PublishedState::Unpublishing;
    }

    /// Drop pending marks, returning to the persisted state
    pub fn clear_pending(&mut self) {
        self.pending = PendingChanges::default();
        self.state = if self.published {
            PublishedState::Published
        } else {
            PublishedState::Unpublished
        };
    }

    /// Cultures that would be published once the pending marks are applied
    pub fn published_cultures_after_commit(&self) -> BTreeSet<String> {
        let mut cultures = self.cultures.published();
        cultures.extend(self.pending.publishing.iter().cloned());
        for c in &self.pending.unpublishing {
            cultures.remove(c);
        }
        cultures
    }

    fn illegal(&self, action: &str, reason: &str) -> FolioError {
        FolioError::IllegalState {
            document_id: self.id(),
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    // ===== Names before save =====

    /// Resolve the invariant name and check its length
    ///
    /// Variant documents take the default culture's name, or the first
    /// available culture's name when the default culture has none.
    ///
    /// A live published culture cannot lose its name unless it is marked
    /// for unpublishing.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `PublishedCultureUnnamed` or `NameTooLong`.
    pub fn ensure_name(&mut self, default_culture: Option<&str>, max_length: usize) -> Result<()> {
        if self.varies_by_culture() {
            let from_default = default_culture
                .and_then(|c| self.cultures.get(c))
                .filter(|c| c.is_available())
                .map(|c| c.name.clone());
            let derived = from_default.or_else(|| {
                self.cultures
                    .iter()
                    .find(|c| c.is_available())
                    .map(|c| c.name.clone())
            });
            if derived.is_some() {
                self.name = derived;
            }
        }

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(FolioError::EmptyName {
                document_id: self.id(),
            });
        }
        let length = name.chars().count();
        if length > max_length {
            return Err(FolioError::NameTooLong {
                document_id: self.id(),
                length,
                max: max_length,
            });
        }
        if self.published && self.state != PublishedState::Unpublishing {
            let unnamed = self.cultures.iter().find(|c| {
                c.published && !c.is_available() && !self.pending.unpublishing.contains(&c.culture)
            });
            if let Some(culture) = unnamed {
                return Err(FolioError::PublishedCultureUnnamed {
                    document_id: self.id(),
                    culture: culture.culture.clone(),
                });
            }
        }
        for culture in self.cultures.iter() {
            let length = culture.name.chars().count();
            if length > max_length {
                return Err(FolioError::NameTooLong {
                    document_id: self.id(),
                    length,
                    max: max_length,
                });
            }
        }
        Ok(())
    }

    // ===== Edited =====

    /// Recompute `edited` for the document and each culture by diffing draft
    /// against published names and values
    ///
    /// Invariant property differences mark only the default culture edited.
    pub fn recompute_edited(&mut self, default_culture: Option<&str>) {
        let invariant_edited = self
            .properties
            .values()
            .any(|p| p.is_edited(&ValueScope::Invariant));

        if self.varies_by_culture() {
            let codes: Vec<String> = self.cultures.iter().map(|c| c.culture.clone()).collect();
            for code in codes {
                let values_edited = self
                    .properties
                    .values()
                    .any(|p| p.is_edited(&ValueScope::Culture(code.clone())));
                let is_default = default_culture == Some(code.as_str());
                if let Some(info) = self.cultures.get_mut(&code) {
                    info.edited = !info.published
                        || info.publish_name.as_deref() != Some(info.name.as_str())
                        || values_edited
                        || (is_default && invariant_edited);
                }
            }
            self.edited = !self.published
                || invariant_edited
                || self.cultures.iter().any(|c| c.edited);
        } else {
            self.edited = !self.published
                || self.publish_name != self.name
                || self
                    .properties
                    .values()
                    .any(|p| p.is_edited(&ValueScope::All));
        }
    }

    /// Cultures whose name or culture values differ from `previous`
    ///
    /// Every culture is new when there is no previous state. Cultures that
    /// existed in `previous` and are gone now count as changed.
    pub fn cultures_changed_since(&self, previous: Option<&Document>) -> BTreeSet<String> {
        let removed = previous
            .into_iter()
            .flat_map(|p| p.cultures.iter())
            .filter(|before| self.cultures.get(&before.culture).is_none())
            .map(|before| before.culture.clone());
        self.cultures
            .iter()
            .filter(|info| {
                let Some(previous) = previous else {
                    return true;
                };
                let Some(before) = previous.cultures.get(&info.culture) else {
                    return true;
                };
                before.name != info.name
                    || self.properties.values().any(|p| {
                        let old = previous
                            .properties
                            .get(&p.alias)
                            .map(|o| culture_drafts(o, &info.culture))
                            .unwrap_or_default();
                        culture_drafts(p, &info.culture) != old
                    })
            })
            .map(|info| info.culture.clone())
            .chain(removed)
            .collect()
    }

    // ===== Versions =====

    pub fn snapshot(&self) -> VersionSnapshot {
        VersionSnapshot {
            name: self.name.clone(),
            culture_names: self
                .cultures
                .iter()
                .map(|c| (c.culture.clone(), c.name.clone()))
                .collect(),
            values: self
                .properties
                .values()
                .map(|p| (p.alias.clone(), p.draft_values()))
                .collect(),
        }
    }

    /// Freeze the current version into history and start a new current one
    ///
    /// The frozen version becomes the published version.
    pub fn freeze_current_version(&mut self, now: DateTime<Utc>) {
        let frozen = Version {
            id: self.current_version_id,
            date: now,
            published_version_id: self.published_version_id,
            snapshot: self.snapshot(),
        };
        self.published_version_id = Some(frozen.id);
        self.history.push(frozen);
        self.current_version_id = VersionId::new();
    }

    /// Number of version rows: history plus the current version
    pub fn version_count(&self) -> usize {
        self.history.len() + 1
    }

    /// History and current version, newest first
    pub fn versions(&self) -> Vec<Version> {
        let mut versions = vec![Version {
            id: self.current_version_id,
            date: self.update_date,
            published_version_id: self.published_version_id,
            snapshot: self.snapshot(),
        }];
        versions.extend(self.history.iter().rev().cloned());
        versions
    }

    /// Copy names and draft values back from a version snapshot
    ///
    /// With a culture only that culture's name and values are restored.
    /// Without one, every name and value is. A culture missing from the
    /// snapshot loses its name. Published state is left alone.
    ///
    /// # Errors
    ///
    /// `CultureNotSupported` for a culture on an invariant document,
    /// `InvalidCulture` for a malformed code.
    pub fn restore_snapshot(&mut self, snapshot: &VersionSnapshot, culture: Option<&str>) -> Result<()> {
        let now = Utc::now();
        let scope = match culture {
            Some(culture) => {
                let culture = self.require_variant_culture(culture)?;
                let name = snapshot.culture_names.get(&culture).cloned().unwrap_or_default();
                self.cultures.set_name(&culture, &name, now);
                ValueScope::Culture(culture)
            }
            None => {
                if self.varies_by_culture() {
                    let current: Vec<String> = self.cultures.iter().map(|c| c.culture.clone()).collect();
                    for code in current {
                        if !snapshot.culture_names.contains_key(&code) {
                            self.cultures.set_name(&code, "", now);
                        }
                    }
                    for (code, name) in &snapshot.culture_names {
                        self.cultures.set_name(code, name, now);
                    }
                }
                self.name = snapshot.name.clone();
                ValueScope::All
            }
        };
        let empty = BTreeMap::new();
        for property in self.properties.values_mut() {
            let drafts = snapshot.values.get(&property.alias).unwrap_or(&empty);
            property.restore_drafts(drafts, &scope);
        }
        Ok(())
    }

    // ===== Copy =====

    /// Turn this value into a fresh, never-published copy
    pub fn reset_for_copy(&mut self) {
        let now = Utc::now();
        self.node.id = 0;
        self.node.key = Uuid::new_v4();
        self.node.trashed = false;
        self.published = false;
        self.publish_name = None;
        self.publish_date = None;
        for culture in self.cultures.iter_mut() {
            culture.published = false;
            culture.publish_name = None;
            culture.publish_date = None;
            culture.edited = true;
        }
        for property in self.properties.values_mut() {
            property.clear_published();
        }
        self.pending = PendingChanges::default();
        self.state = PublishedState::Unpublished;
        self.history.clear();
        self.current_version_id = VersionId::new();
        self.published_version_id = None;
        self.edited = true;
        self.create_date = now;
        self.update_date = now;
    }
}

fn culture_drafts(property: &Property, culture: &str) -> Vec<(Option<String>, Value)> {
    property
        .draft_values()
        .into_iter()
        .filter(|((c, _), _)| c.as_deref() == Some(culture))
        .map(|((_, segment), value)| (segment, value))
        .collect()
}
