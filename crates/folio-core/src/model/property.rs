//! Property value store
//!
//! Each property keeps one slot per `(culture, segment)`. A slot holds the
//! draft value and, once published, the published value. Culture codes in
//! slot keys are canonical.

use std::collections::BTreeMap;

use serde_json::Value;

use super::ContentVariation;
use crate::errors::{FolioError, Result};

/// `(culture, segment)`; `None` is the invariant/neutral slot
pub type SlotKey = (Option<String>, Option<String>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyValue {
    pub draft: Option<Value>,
    pub published: Option<Value>,
}

impl PropertyValue {
    pub fn is_edited(&self) -> bool {
        self.draft != self.published
    }
}

/// Which slots an operation touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueScope {
    All,
    Invariant,
    Culture(String),
}

impl ValueScope {
    fn matches(&self, key: &SlotKey) -> bool {
        match self {
            ValueScope::All => true,
            ValueScope::Invariant => key.0.is_none(),
            ValueScope::Culture(culture) => key.0.as_deref() == Some(culture.as_str()),
        }
    }
}

/// Null, blank strings and empty collections count as "no value"
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub alias: String,
    pub variation: ContentVariation,
    values: BTreeMap<SlotKey, PropertyValue>,
}

impl Property {
    pub fn new(alias: impl Into<String>, variation: ContentVariation) -> Self {
        Self {
            alias: alias.into(),
            variation,
            values: BTreeMap::new(),
        }
    }

    fn key_for_read(&self, culture: Option<&str>, segment: Option<&str>) -> Option<SlotKey> {
        let culture = if self.variation.varies_by_culture() {
            Some(culture?.to_string())
        } else {
            None
        };
        let segment = if self.variation.varies_by_segment() {
            segment.map(str::to_string)
        } else {
            None
        };
        Some((culture, segment))
    }

    /// Read a draft or published value
    ///
    /// Invariant properties answer from their single slot whatever culture is
    /// asked for. Variant properties answer `None` when no culture is given.
    pub fn get_value(
        &self,
        culture: Option<&str>,
        segment: Option<&str>,
        published: bool,
    ) -> Option<&Value> {
        let key = self.key_for_read(culture, segment)?;
        let slot = self.values.get(&key)?;
        if published {
            slot.published.as_ref()
        } else {
            slot.draft.as_ref()
        }
    }

    /// Write a draft value; `None` or JSON null clears it
    ///
    /// # Errors
    ///
    /// `VariationNotSupported` when the slot does not match the property's
    /// variation (a culture on an invariant property, no culture on a variant
    /// one, a segment on a property that does not vary by segment).
    pub fn set_value(
        &mut self,
        value: Option<Value>,
        culture: Option<&str>,
        segment: Option<&str>,
    ) -> Result<()> {
        if !self.variation.supports(culture, segment) {
            return Err(FolioError::VariationNotSupported {
                alias: self.alias.clone(),
                culture: culture.map(str::to_string),
                segment: segment.map(str::to_string),
            });
        }
        let key = (culture.map(str::to_string), segment.map(str::to_string));
        let value = value.filter(|v| !v.is_null());
        let slot = self.values.entry(key.clone()).or_default();
        slot.draft = value;
        if slot.draft.is_none() && slot.published.is_none() {
            self.values.remove(&key);
        }
        Ok(())
    }

    pub fn slots(&self) -> impl Iterator<Item = (&SlotKey, &PropertyValue)> {
        self.values.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut BTreeMap<SlotKey, PropertyValue> {
        &mut self.values
    }

    /// Copy draft into published for every slot in `scope`
    pub fn publish_values(&mut self, scope: &ValueScope) {
        for (key, slot) in self.values.iter_mut() {
            if scope.matches(key) {
                slot.published = slot.draft.clone();
            }
        }
        self.values
            .retain(|_, slot| slot.draft.is_some() || slot.published.is_some());
    }

    /// Replace the drafts in `scope` with `drafts`
    ///
    /// Slots the property's variation no longer supports are skipped.
    pub fn restore_drafts(&mut self, drafts: &BTreeMap<SlotKey, Value>, scope: &ValueScope) {
        for (key, slot) in self.values.iter_mut() {
            if scope.matches(key) {
                slot.draft = None;
            }
        }
        for (key, value) in drafts {
            if scope.matches(key) && self.variation.supports(key.0.as_deref(), key.1.as_deref()) {
                self.values.entry(key.clone()).or_default().draft = Some(value.clone());
            }
        }
        self.values
            .retain(|_, slot| slot.draft.is_some() || slot.published.is_some());
    }

    /// Drop every published value
    pub fn clear_published(&mut self) {
        for slot in self.values.values_mut() {
            slot.published = None;
        }
        self.values.retain(|_, slot| slot.draft.is_some());
    }

    /// Whether any slot in `scope` has a draft differing from its published value
    pub fn is_edited(&self, scope: &ValueScope) -> bool {
        self.values
            .iter()
            .any(|(key, slot)| scope.matches(key) && slot.is_edited())
    }

    /// Whether the neutral-segment draft for `culture` holds a real value
    pub fn has_draft_value(&self, culture: Option<&str>) -> bool {
        !is_empty_value(self.get_value(culture, None, false))
    }

    /// Draft values only, used to snapshot versions
    pub fn draft_values(&self) -> BTreeMap<SlotKey, Value> {
        self.values
            .iter()
            .filter_map(|(key, slot)| slot.draft.clone().map(|v| (key.clone(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_invariant_property_ignores_culture_on_read() {
        let mut p = Property::new("title", ContentVariation::Nothing);
        p.set_value(Some(json!("Hello")), None, None)
            .expect("Should set invariant value");

        assert_eq!(p.get_value(Some("fr-fr"), None, false), Some(&json!("Hello")));
        assert_eq!(p.get_value(None, None, false), Some(&json!("Hello")));
    }

    #[test]
    fn test_variant_property_needs_culture() {
        let mut p = Property::new("title", ContentVariation::Culture);
        p.set_value(Some(json!("Bonjour")), Some("fr-fr"), None)
            .expect("Should set variant value");

        assert_eq!(p.get_value(None, None, false), None);
        assert_eq!(p.get_value(Some("en-us"), None, false), None);
        assert_eq!(p.get_value(Some("fr-fr"), None, false), Some(&json!("Bonjour")));
    }

    #[test]
    fn test_set_value_rejects_mismatched_slot() {
        let mut invariant = Property::new("title", ContentVariation::Nothing);
        let result = invariant.set_value(Some(json!("x")), Some("en-us"), None);
        assert!(matches!(
            result,
            Err(FolioError::VariationNotSupported { .. })
        ));

        let mut variant = Property::new("title", ContentVariation::Culture);
        let result = variant.set_value(Some(json!("x")), None, None);
        assert!(matches!(
            result,
            Err(FolioError::VariationNotSupported { .. })
        ));
    }

    #[test]
    fn test_publish_values_scoped_to_culture() {
        let mut p = Property::new("title", ContentVariation::Culture);
        p.set_value(Some(json!("Hello")), Some("en-us"), None).expect("Should set");
        p.set_value(Some(json!("Bonjour")), Some("fr-fr"), None).expect("Should set");

        p.publish_values(&ValueScope::Culture("fr-fr".to_string()));

        assert_eq!(p.get_value(Some("fr-fr"), None, true), Some(&json!("Bonjour")));
        assert_eq!(p.get_value(Some("en-us"), None, true), None);
        assert!(p.is_edited(&ValueScope::Culture("en-us".to_string())));
        assert!(!p.is_edited(&ValueScope::Culture("fr-fr".to_string())));
    }

    #[test]
    fn test_clearing_draft_keeps_published_slot() {
        let mut p = Property::new("body", ContentVariation::Nothing);
        p.set_value(Some(json!("text")), None, None).expect("Should set");
        p.publish_values(&ValueScope::All);
        p.set_value(None, None, None).expect("Should clear");

        assert_eq!(p.get_value(None, None, false), None);
        assert_eq!(p.get_value(None, None, true), Some(&json!("text")));
        assert!(p.is_edited(&ValueScope::All));
    }

    #[test]
    fn test_restore_drafts_only_touches_scope() {
        let mut p = Property::new("title", ContentVariation::Culture);
        p.set_value(Some(json!("old fr")), Some("fr-fr"), None).expect("Should set");
        let saved = p.draft_values();
        p.set_value(Some(json!("new fr")), Some("fr-fr"), None).expect("Should set");
        p.set_value(Some(json!("new en")), Some("en-us"), None).expect("Should set");

        p.restore_drafts(&saved, &ValueScope::Culture("fr-fr".to_string()));

        assert_eq!(p.get_value(Some("fr-fr"), None, false), Some(&json!("old fr")));
        assert_eq!(p.get_value(Some("en-us"), None, false), Some(&json!("new en")));

        p.restore_drafts(&saved, &ValueScope::All);
        assert_eq!(p.get_value(Some("en-us"), None, false), None);
        assert_eq!(p.slots().count(), 1);
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&json!(null))));
        assert!(is_empty_value(Some(&json!("  "))));
        assert!(is_empty_value(Some(&json!([]))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!("a"))));
    }

    proptest! {
        #[test]
        fn prop_set_then_get_round_trips(text in "[a-zA-Z0-9 ]{1,24}", culture in "[a-z]{2}-[a-z]{2}") {
            let mut p = Property::new("title", ContentVariation::Culture);
            p.set_value(Some(json!(text.clone())), Some(&culture), None).unwrap();
            prop_assert_eq!(p.get_value(Some(&culture), None, false), Some(&json!(text)));
            prop_assert!(p.is_edited(&ValueScope::All));
            p.publish_values(&ValueScope::All);
            prop_assert!(!p.is_edited(&ValueScope::All));
        }
    }
}
