use folio_core_types::DocumentId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuditKind {
    Save,
    SaveVariant,
    Publish,
    PublishVariant,
    Unpublish,
    UnpublishVariant,
    Move,
    Copy,
    Sort,
    Delete,
    RollBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub kind: AuditKind,
    pub document_id: DocumentId,
    pub message: String,
    /// Extra detail such as the language list of a variant entry
    pub parameters: Option<String>,
}

impl AuditEntry {
    pub fn new(kind: AuditKind, document_id: DocumentId, message: impl Into<String>) -> Self {
        Self {
            kind,
            document_id,
            message: message.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }
}
