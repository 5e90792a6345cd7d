//! Variation normalizer
//!
//! Brings a stored document in line with its content type after the type's
//! (or a property type's) variation settings changed. Edited flags are then
//! recomputed from the normalized draft and published values.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::model::{ContentType, ContentVariation, CultureVariation, Document, Property, SlotKey};

/// Normalize `doc` against `content_type`
///
/// Returns `true` when anything about the document's variation changed.
pub fn normalize(doc: &mut Document, content_type: &ContentType, default_culture: Option<&str>) -> bool {
    let mut changed = false;
    let old_variation = doc.variation;
    let new_variation = content_type.variation;

    if old_variation.varies_by_culture() && !new_variation.varies_by_culture() {
        collapse_names(doc, default_culture);
        changed = true;
    } else if !old_variation.varies_by_culture() && new_variation.varies_by_culture() {
        expand_names(doc, default_culture);
        changed = true;
    }
    doc.variation = new_variation;

    let known: Vec<String> = doc.properties().map(|p| p.alias.clone()).collect();
    for alias in known {
        if content_type.property_type(&alias).is_none() {
            doc.remove_property(&alias);
            changed = true;
        }
    }

    for property_type in &content_type.property_types {
        let target = content_type.effective_variation(property_type);
        match doc.remove_property(&property_type.alias) {
            Some(mut property) => {
                if property.variation != target {
                    renormalize_property(&mut property, target, default_culture);
                    changed = true;
                }
                doc.insert_property(property);
            }
            None => {
                doc.insert_property(Property::new(property_type.alias.clone(), target));
                changed = true;
            }
        }
    }

    doc.recompute_edited(default_culture);
    changed
}

fn collapse_names(doc: &mut Document, default_culture: Option<&str>) {
    if let Some(info) = default_culture.and_then(|c| doc.cultures.get(c)) {
        doc.name = Some(info.name.clone());
        doc.publish_name = info.publish_name.clone();
    }
    doc.cultures.clear();
}

fn expand_names(doc: &mut Document, default_culture: Option<&str>) {
    let (Some(culture), Some(name)) = (default_culture, doc.name.clone()) else {
        return;
    };
    doc.cultures.insert(CultureVariation {
        culture: culture.to_string(),
        name,
        publish_name: doc.publish_name.clone(),
        published: doc.published && doc.publish_name.is_some(),
        edited: true,
        publish_date: doc.publish_date,
        update_date: Utc::now(),
    });
}

/// Move slots between the invariant and the default-culture key
fn renormalize_property(property: &mut Property, target: ContentVariation, default_culture: Option<&str>) {
    let from_culture = property.variation.varies_by_culture();
    let to_culture = target.varies_by_culture();
    let keep_segments = target.varies_by_segment();

    let slots = std::mem::take(property.slots_mut());
    let mut renormalized = BTreeMap::new();
    for ((culture, segment), value) in slots {
        if segment.is_some() && !keep_segments {
            continue;
        }
        let key: Option<SlotKey> = match (from_culture, to_culture) {
            (true, false) => (culture.as_deref() == default_culture && culture.is_some())
                .then(|| (None, segment)),
            (false, true) => default_culture.map(|c| (Some(c.to_string()), segment)),
            _ => Some((culture, segment)),
        };
        if let Some(key) = key {
            renormalized.insert(key, value);
        }
    }
    *property.slots_mut() = renormalized;
    property.variation = target;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyType;
    use serde_json::json;

    fn page(variation: ContentVariation) -> ContentType {
        ContentType::new("page", variation)
            .with_property(PropertyType::new("title", ContentVariation::Culture))
    }

    #[test]
    fn test_variant_to_invariant_keeps_default_culture_values() {
        let variant = page(ContentVariation::Culture);
        let mut doc = Document::new(&variant, -1, "");
        doc.set_culture_name("Hello", "en-US").expect("Should set");
        doc.set_culture_name("Bonjour", "fr-FR").expect("Should set");
        doc.set_value("title", json!("Hello title"), Some("en-US"), None)
            .expect("Should set");
        doc.set_value("title", json!("Titre"), Some("fr-FR"), None)
            .expect("Should set");

        let changed = normalize(&mut doc, &page(ContentVariation::Nothing), Some("en-us"));

        assert!(changed);
        assert!(!doc.varies_by_culture());
        assert_eq!(doc.name.as_deref(), Some("Hello"));
        assert!(doc.cultures.is_empty());
        assert_eq!(doc.get_value("title", None, None, false), Some(&json!("Hello title")));
        let title = doc.property("title").expect("Should keep property");
        assert_eq!(title.slots().count(), 1);
    }

    #[test]
    fn test_invariant_to_variant_moves_value_to_default_culture() {
        let invariant = page(ContentVariation::Nothing);
        let mut doc = Document::new(&invariant, -1, "Home");
        doc.set_value("title", json!("Shared"), None, None)
            .expect("Should set");

        normalize(&mut doc, &page(ContentVariation::Culture), Some("en-us"));

        assert!(doc.varies_by_culture());
        assert_eq!(doc.culture_name("en-us"), Some("Home"));
        assert_eq!(
            doc.get_value("title", Some("en-us"), None, false),
            Some(&json!("Shared"))
        );
        assert_eq!(doc.get_value("title", Some("fr-fr"), None, false), None);
    }

    #[test]
    fn test_unchanged_type_reports_no_change() {
        let ct = page(ContentVariation::Culture);
        let mut doc = Document::new(&ct, -1, "");
        assert!(!normalize(&mut doc, &ct, Some("en-us")));
    }

    #[test]
    fn test_edited_recomputed_from_values_after_normalize() {
        let variant = page(ContentVariation::Culture);
        let mut doc = Document::new(&variant, -1, "");
        doc.set_culture_name("Hello", "en-US").expect("Should set");
        doc.set_value("title", json!("T"), Some("en-US"), None)
            .expect("Should set");
        for p in doc.properties_mut() {
            p.publish_values(&crate::model::ValueScope::All);
        }
        doc.cultures.publish("en-us", Utc::now());
        doc.published = true;
        doc.publish_name = Some("Hello".to_string());
        doc.recompute_edited(Some("en-us"));
        assert!(!doc.edited);

        normalize(&mut doc, &page(ContentVariation::Nothing), Some("en-us"));
        assert!(!doc.edited, "Draft and published still agree after collapsing");
    }
}
