use folio_core_types::{ContentTypeId, DocumentId, RequestContext, RequestId, TraceId};
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every structural failure in Folio. Each kind maps
/// to a stable error code usable by callers, tests and external surfaces.
/// Business-rule outcomes of publishing are *not* errors; they are reported
/// through `PublishResultType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,

    // Structural/Validation
    InvalidInput,
    InvalidName,
    InvalidCulture,
    InvalidVariation,
    InvalidMove,
    InvalidSort,
    AlreadyExists,

    // Lifecycle
    IllegalState,
    Scope,

    // Integration/IO
    Config,
    Serialization,
    Persistence,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::InvalidCulture => "ERR_INVALID_CULTURE",
            ExErrorKind::InvalidVariation => "ERR_INVALID_VARIATION",
            ExErrorKind::InvalidMove => "ERR_INVALID_MOVE",
            ExErrorKind::InvalidSort => "ERR_INVALID_SORT",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::IllegalState => "ERR_ILLEGAL_STATE",
            ExErrorKind::Scope => "ERR_SCOPE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    culture: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            culture: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add culture context
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Tag with the request and trace ids of a service call
    pub fn with_context(self, ctx: &RequestContext) -> Self {
        let err = self.with_request_id(ctx.request_id.clone());
        match &ctx.trace_id {
            Some(trace_id) => err.with_trace_id(trace_id.clone()),
            None => err,
        }
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(culture) = &self.culture {
            write!(f, " (culture: {})", culture)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Structural failures raised by Folio operations
///
/// These indicate caller misuse or integrity problems. A rejected publish is
/// not one of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    // ===== Lookup =====
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: DocumentId },

    #[error("Parent not found: {parent_id}")]
    ParentNotFound { parent_id: DocumentId },

    #[error("Content type not found: {content_type_id}")]
    ContentTypeNotFound { content_type_id: ContentTypeId },

    #[error("No content type with alias '{alias}'")]
    ContentTypeAliasNotFound { alias: String },

    #[error("Content type alias '{alias}' is already in use")]
    DuplicateContentTypeAlias { alias: String },

    #[error("Document {document_id} has no property '{alias}'")]
    PropertyNotFound { document_id: DocumentId, alias: String },

    #[error("Version {version_id} not found for document {document_id}")]
    VersionNotFound {
        document_id: DocumentId,
        version_id: String,
    },

    // ===== Names =====
    #[error("Cannot save document {document_id} with an empty name")]
    EmptyName { document_id: DocumentId },

    #[error("Document {document_id} is published in {culture}, which has no name; unpublish the culture first")]
    PublishedCultureUnnamed {
        document_id: DocumentId,
        culture: String,
    },

    #[error("Name of document {document_id} is {length} characters, at most {max} allowed")]
    NameTooLong {
        document_id: DocumentId,
        length: usize,
        max: usize,
    },

    // ===== Cultures & variation =====
    #[error("Invalid culture '{culture}': {reason}")]
    InvalidCulture { culture: String, reason: String },

    #[error("Document {document_id} does not vary by culture, cannot use culture '{culture}'")]
    CultureNotSupported {
        document_id: DocumentId,
        culture: String,
    },

    #[error("Document {document_id} varies by culture, a culture is required")]
    CultureRequired { document_id: DocumentId },

    #[error("Property '{alias}' does not support culture {culture:?}, segment {segment:?}")]
    VariationNotSupported {
        alias: String,
        culture: Option<String>,
        segment: Option<String>,
    },

    // ===== Tree =====
    #[error("Cannot move document {document_id} under {target_id}: {reason}")]
    InvalidMoveTarget {
        document_id: DocumentId,
        target_id: DocumentId,
        reason: String,
    },

    #[error("Invalid sort request: {reason}")]
    InvalidSort { reason: String },

    // ===== Lifecycle =====
    #[error("Document {document_id} carries pending publish marks, commit them instead of saving")]
    PendingPublishMarks { document_id: DocumentId },

    #[error("Cannot branch-publish a document that has never been saved")]
    BranchPublishNewDocument,

    #[error("Cannot {action} document {document_id}: {reason}")]
    IllegalState {
        document_id: DocumentId,
        action: String,
        reason: String,
    },

    #[error("A scope is already open")]
    ScopeAlreadyOpen,

    #[error("No scope is open")]
    NoActiveScope,

    // ===== Integration =====
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<FolioError> for ExError {
    fn from(err: FolioError) -> Self {
        let message = err.to_string();
        match err {
            FolioError::DocumentNotFound { document_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(document_id)
                .with_message(message),
            FolioError::ParentNotFound { parent_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(parent_id)
                .with_message(message),
            FolioError::ContentTypeNotFound { content_type_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(content_type_id)
                    .with_message(message)
            }
            FolioError::ContentTypeAliasNotFound { alias } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(alias)
                .with_message(message),
            FolioError::DuplicateContentTypeAlias { alias } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity_id(alias)
                    .with_message(message)
            }
            FolioError::PropertyNotFound { document_id, .. } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            FolioError::VersionNotFound { document_id, .. } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(document_id)
                .with_message(message),
            FolioError::EmptyName { document_id } | FolioError::NameTooLong { document_id, .. } => {
                ExError::new(ExErrorKind::InvalidName)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            FolioError::PublishedCultureUnnamed {
                document_id,
                culture,
            } => ExError::new(ExErrorKind::InvalidName)
                .with_entity_id(document_id)
                .with_culture(culture)
                .with_message(message),
            FolioError::InvalidCulture { culture, .. } => {
                ExError::new(ExErrorKind::InvalidCulture)
                    .with_culture(culture)
                    .with_message(message)
            }
            FolioError::CultureNotSupported {
                document_id,
                culture,
            } => ExError::new(ExErrorKind::InvalidCulture)
                .with_entity_id(document_id)
                .with_culture(culture)
                .with_message(message),
            FolioError::CultureRequired { document_id } => {
                ExError::new(ExErrorKind::InvalidCulture)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            FolioError::VariationNotSupported { alias, .. } => {
                ExError::new(ExErrorKind::InvalidVariation)
                    .with_entity_id(alias)
                    .with_message(message)
            }
            FolioError::InvalidMoveTarget { document_id, .. } => {
                ExError::new(ExErrorKind::InvalidMove)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            FolioError::InvalidSort { .. } => {
                ExError::new(ExErrorKind::InvalidSort).with_message(message)
            }
            FolioError::PendingPublishMarks { document_id }
            | FolioError::IllegalState { document_id, .. } => {
                ExError::new(ExErrorKind::IllegalState)
                    .with_entity_id(document_id)
                    .with_message(message)
            }
            FolioError::BranchPublishNewDocument => {
                ExError::new(ExErrorKind::IllegalState).with_message(message)
            }
            FolioError::ScopeAlreadyOpen | FolioError::NoActiveScope => {
                ExError::new(ExErrorKind::Scope).with_message(message)
            }
            FolioError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }
            FolioError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for FolioError {
    fn from(err: config::ConfigError) -> Self {
        FolioError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
