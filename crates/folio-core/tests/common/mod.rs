use folio_core::model::{ContentType, ContentVariation, Document, Language, PropertyType};

/// en-US (default, mandatory), fr-FR, de-DE
#[allow(dead_code)]
pub fn languages() -> Vec<Language> {
    vec![
        Language::new("en-US", "English (United States)")
            .default_language()
            .mandatory(),
        Language::new("fr-FR", "French (France)"),
        Language::new("de-DE", "German (Germany)"),
    ]
}

/// Culture-variant type with a variant title and an invariant footer
#[allow(dead_code)]
pub fn variant_type() -> ContentType {
    let mut ct = ContentType::new("page", ContentVariation::Culture)
        .with_property(PropertyType::new("title", ContentVariation::Culture))
        .with_property(PropertyType::new("footer", ContentVariation::Nothing));
    ct.id = 1;
    ct
}

#[allow(dead_code)]
pub fn invariant_type() -> ContentType {
    let mut ct = ContentType::new("article", ContentVariation::Nothing)
        .with_property(PropertyType::new("body", ContentVariation::Nothing));
    ct.id = 2;
    ct
}

/// A variant document named in every given culture, with a title per culture
#[allow(dead_code)]
pub fn named_variant(id: i32, cultures: &[(&str, &str)]) -> Document {
    let mut doc = Document::new(&variant_type(), -1, "");
    doc.node.id = id;
    doc.node.path = vec![-1, id];
    doc.node.level = 1;
    for (culture, name) in cultures {
        doc.set_culture_name(name, culture).expect("Should set culture name");
        doc.set_value("title", serde_json::json!(name), Some(culture), None)
            .expect("Should set title");
    }
    doc.ensure_name(Some("en-us"), 255).expect("Should resolve name");
    doc.recompute_edited(Some("en-us"));
    doc
}
