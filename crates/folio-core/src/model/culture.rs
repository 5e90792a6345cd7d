//! Per-culture state of a variant document

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FolioError, Result};

/// Culture argument meaning "every culture"
pub const WILDCARD: &str = "*";

/// Canonical (lowercase, trimmed) culture code
///
/// # Errors
///
/// `InvalidCulture` for an empty code or the wildcard.
pub fn canonical_culture(code: &str) -> Result<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(FolioError::InvalidCulture {
            culture: code.to_string(),
            reason: "culture code is empty".to_string(),
        });
    }
    if trimmed == WILDCARD {
        return Err(FolioError::InvalidCulture {
            culture: code.to_string(),
            reason: "the wildcard is not a culture".to_string(),
        });
    }
    Ok(trimmed.to_lowercase())
}

/// Cultures an API call applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CultureSelection {
    All,
    Only(Vec<String>),
}

impl CultureSelection {
    /// `"*"` selects every culture, anything else that single culture
    pub fn parse(culture: &str) -> Self {
        if culture.trim() == WILDCARD {
            CultureSelection::All
        } else {
            CultureSelection::Only(vec![culture.to_string()])
        }
    }

    /// Canonical codes of an `Only` selection
    ///
    /// # Errors
    ///
    /// `InvalidCulture` when a code is empty or the wildcard.
    pub fn canonical(&self) -> Result<Option<BTreeSet<String>>> {
        match self {
            CultureSelection::All => Ok(None),
            CultureSelection::Only(codes) => codes
                .iter()
                .map(|c| canonical_culture(c))
                .collect::<Result<BTreeSet<_>>>()
                .map(Some),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureVariation {
    pub culture: String,
    pub name: String,
    /// Name as of the last publish of this culture; kept after unpublishing
    pub publish_name: Option<String>,
    pub published: bool,
    pub edited: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub update_date: DateTime<Utc>,
}

impl CultureVariation {
    fn new(culture: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            culture,
            name,
            publish_name: None,
            published: false,
            edited: true,
            publish_date: None,
            update_date: now,
        }
    }

    /// A culture is available once it has a name
    pub fn is_available(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Culture variations keyed by canonical culture code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CultureInfos {
    items: BTreeMap<String, CultureVariation>,
}

impl CultureInfos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the draft name of a culture, creating it if needed
    ///
    /// An empty name removes a culture that was never published. A culture
    /// with publish state keeps its entry and becomes unavailable.
    pub fn set_name(&mut self, culture: &str, name: &str, now: DateTime<Utc>) {
        if name.trim().is_empty() {
            let keep = self
                .items
                .get(culture)
                .map(|c| c.published || c.publish_name.is_some())
                .unwrap_or(false);
            if !keep {
                self.items.remove(culture);
                return;
            }
        }
        match self.items.get_mut(culture) {
            Some(info) => {
                if info.name != name {
                    info.name = name.to_string();
                    info.update_date = now;
                }
            }
            None => {
                self.items.insert(
                    culture.to_string(),
                    CultureVariation::new(culture.to_string(), name.to_string(), now),
                );
            }
        }
    }

    pub fn get(&self, culture: &str) -> Option<&CultureVariation> {
        self.items.get(culture)
    }

    pub fn get_mut(&mut self, culture: &str) -> Option<&mut CultureVariation> {
        self.items.get_mut(culture)
    }

    pub fn insert(&mut self, info: CultureVariation) {
        self.items.insert(info.culture.clone(), info);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CultureVariation> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CultureVariation> {
        self.items.values_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_available(&self, culture: &str) -> bool {
        self.items
            .get(culture)
            .map(CultureVariation::is_available)
            .unwrap_or(false)
    }

    pub fn available(&self) -> BTreeSet<String> {
        self.items
            .values()
            .filter(|c| c.is_available())
            .map(|c| c.culture.clone())
            .collect()
    }

    pub fn is_published(&self, culture: &str) -> bool {
        self.items.get(culture).map(|c| c.published).unwrap_or(false)
    }

    pub fn published(&self) -> BTreeSet<String> {
        self.items
            .values()
            .filter(|c| c.published)
            .map(|c| c.culture.clone())
            .collect()
    }

    /// A culture that does not exist counts as edited
    pub fn is_edited(&self, culture: &str) -> bool {
        self.items.get(culture).map(|c| c.edited).unwrap_or(true)
    }

    /// Record a publish of `culture`: the current name becomes the publish name
    pub fn publish(&mut self, culture: &str, now: DateTime<Utc>) {
        if let Some(info) = self.items.get_mut(culture) {
            info.publish_name = Some(info.name.clone());
            info.published = true;
            info.edited = false;
            info.publish_date = Some(now);
            info.update_date = now;
        }
    }

    /// Clear the published flag; the publish name is retained
    pub fn unpublish(&mut self, culture: &str) {
        if let Some(info) = self.items.get_mut(culture) {
            info.published = false;
        }
    }
}
