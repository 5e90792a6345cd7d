//! Folio Core - versioned multi-culture document kernel
//!
//! This crate holds everything that decides *what happens* to a document tree,
//! without doing any I/O of its own:
//! - Document, culture and property-value model with draft/published slots
//! - Variation normalization when content-type variation settings change
//! - Publish state machine (can-publish checks, publish/unpublish strategies)
//! - Branch cascade helpers (transition codes, branch decisions, tree moves)
//! - Change notification batching and dispatch
//! - Collaborator traits implemented by storage, scheduling, cache and audit layers
//!
//! Orchestration of these pieces inside a transactional scope lives in
//! `folio-engine`.

pub mod cascade;
pub mod collaborators;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod notifications;
pub mod publishing;
pub mod settings;

pub use folio_core_types as types;

pub use cascade::TransitionCode;
pub use errors::{ExError, ExErrorKind, FolioError, Result};
pub use model::{
    ContentNode, ContentType, ContentVariation, CultureSelection, CultureVariation, Document,
    Language, Property, PropertyType, PublishedState, Version,
};
pub use notifications::{
    AuditEntry, AuditKind, CacheMessage, CachePayload, ChangeEvent, ChangeKind, MutationBatch,
};
pub use publishing::{PublishResult, PublishResultType};
pub use settings::Settings;
