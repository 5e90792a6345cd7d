use folio_core::model::{ContentType, ContentVariation, CultureSelection, Document, PropertyType};
use folio_core::notifications::{CachePayload, ChangeKind};
use folio_core::settings::{LanguageSettings, Settings};
use folio_core::types::DocumentId;
use folio_engine::{Collaborators, ContentService, OperationOutcome};
use folio_store::{RecordingAudit, RecordingCacheRefresher};
use serde_json::json;

/// A service on in-memory stores with recorders for cache messages and audit
pub struct Harness {
    pub service: ContentService,
    pub cache: RecordingCacheRefresher,
    pub audit: RecordingAudit,
}

fn language(iso_code: &str, name: &str, is_default: bool, is_mandatory: bool) -> LanguageSettings {
    LanguageSettings {
        iso_code: iso_code.to_string(),
        name: name.to_string(),
        is_default,
        is_mandatory,
    }
}

/// en-US (default), fr-FR, de-DE; en-US is mandatory when `mandatory_default` is set
#[allow(dead_code)]
pub fn settings(mandatory_default: bool) -> Settings {
    Settings {
        languages: vec![
            language("en-US", "English (United States)", true, mandatory_default),
            language("fr-FR", "French (France)", false, false),
            language("de-DE", "German (Germany)", false, false),
        ],
        ..Settings::default()
    }
}

/// Content types registered by every harness:
/// - `page`: varies by culture, variant `title`, invariant `footer`
/// - `article`: invariant `body`
/// - `form`: invariant, mandatory `body`
#[allow(dead_code)]
pub fn content_types() -> Vec<ContentType> {
    vec![
        ContentType::new("page", ContentVariation::Culture)
            .with_property(PropertyType::new("title", ContentVariation::Culture))
            .with_property(PropertyType::new("footer", ContentVariation::Nothing)),
        ContentType::new("article", ContentVariation::Nothing)
            .with_property(PropertyType::new("body", ContentVariation::Nothing)),
        ContentType::new("form", ContentVariation::Nothing)
            .with_property(PropertyType::new("body", ContentVariation::Nothing).mandatory()),
    ]
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_settings(settings(true))
    }

    pub fn with_settings(settings: Settings) -> Self {
        let cache = RecordingCacheRefresher::new();
        let audit = RecordingAudit::new();
        let mut collaborators = Collaborators::in_memory();
        collaborators.cache = Box::new(cache.clone());
        collaborators.audit = Box::new(audit.clone());

        let mut service = ContentService::new(settings, collaborators).expect("Should build service");
        for content_type in content_types() {
            service
                .save_content_type(content_type)
                .expect("Should register content type");
        }
        cache.clear();
        audit.clear();
        Self {
            service,
            cache,
            audit,
        }
    }

    /// Forget everything recorded so far
    pub fn reset_recorders(&self) {
        self.cache.clear();
        self.audit.clear();
    }

    /// A saved, unpublished article
    pub fn article(&mut self, name: &str, parent_id: DocumentId) -> Document {
        let mut doc = self
            .service
            .create(name, parent_id, "article")
            .expect("Should create article");
        doc.set_value("body", json!(format!("{} body", name)), None, None)
            .expect("Should set body");
        self.service.save(&mut doc).expect("Should save article");
        doc
    }

    /// A saved and published article
    pub fn published_article(&mut self, name: &str, parent_id: DocumentId) -> Document {
        let mut doc = self.article(name, parent_id);
        let outcome = self
            .service
            .save_and_publish(&mut doc, CultureSelection::All)
            .expect("Should publish article");
        assert!(outcome.value.is_success(), "Should publish {}: {}", name, outcome.value.result);
        doc
    }

    /// A saved variant page named (and titled) in the given cultures
    pub fn page(&mut self, cultures: &[(&str, &str)], parent_id: DocumentId) -> Document {
        let mut doc = self
            .service
            .create("", parent_id, "page")
            .expect("Should create page");
        for (culture, name) in cultures {
            doc.set_culture_name(name, culture).expect("Should set culture name");
            doc.set_value("title", json!(format!("{} title", name)), Some(culture), None)
                .expect("Should set title");
        }
        self.service.save(&mut doc).expect("Should save page");
        doc
    }

    /// Reload a document from the repository
    pub fn reload(&self, id: DocumentId) -> Document {
        self.service.get_by_id(id).expect("Should load document")
    }

    pub fn audit_lines(&self) -> Vec<String> {
        self.audit.lines()
    }
}

/// `id.code` strings of the events of an outcome
#[allow(dead_code)]
pub fn codes<T>(outcome: &OperationOutcome<T>) -> Vec<String> {
    outcome.event_codes()
}

#[allow(dead_code)]
pub fn code(id: DocumentId, code: &str) -> String {
    format!("{}.{}", id, code)
}

#[allow(dead_code)]
pub fn payload(id: DocumentId, kind: ChangeKind) -> CachePayload {
    CachePayload::new(id, kind)
}
