//! Collaborator interfaces
//!
//! The core never touches storage, scheduling, caches or audit logs
//! directly. `folio-engine` drives these traits; `folio-store` provides the
//! in-memory implementations.

use folio_core_types::{ContentTypeId, DocumentId};

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::model::{ContentSchedule, ContentType, Document, ScheduleAction};
use crate::notifications::{AuditEntry, CacheMessage};

/// A store whose writes can be grouped into a scope and committed or
/// discarded together
pub trait Transactional {
    /// # Errors
    ///
    /// `ScopeAlreadyOpen` when a scope is already active.
    fn begin_scope(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// `NoActiveScope` when no scope is active.
    fn complete_scope(&mut self) -> Result<()>;

    /// Discard every write since `begin_scope`
    ///
    /// # Errors
    ///
    /// `NoActiveScope` when no scope is active.
    fn rollback_scope(&mut self) -> Result<()>;
}

pub trait ContentRepository: Transactional + Send {
    /// Allocate an id for a new document
    fn next_id(&mut self) -> DocumentId;

    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    fn get(&self, id: DocumentId) -> Result<Document>;

    fn exists(&self, id: DocumentId) -> bool;

    /// Insert or replace a document with identity
    fn save(&mut self, doc: &Document) -> Result<()>;

    /// Remove a single document; children are the caller's concern
    fn delete(&mut self, id: DocumentId) -> Result<()>;

    /// Direct children of `parent_id` (may be the root or the recycle bin),
    /// by sort order
    fn children(&self, parent_id: DocumentId) -> Result<Vec<Document>>;

    fn by_content_type(&self, content_type_id: ContentTypeId) -> Result<Vec<Document>>;

    /// Every document below `id`, pre-order, siblings by sort order
    fn descendants(&self, id: DocumentId) -> Result<Vec<Document>> {
        let mut out = Vec::new();
        let mut stack: Vec<Document> = self.children(id)?.into_iter().rev().collect();
        while let Some(doc) = stack.pop() {
            let children = self.children(doc.id())?;
            stack.extend(children.into_iter().rev());
            out.push(doc);
        }
        Ok(out)
    }
}

pub trait ContentTypeProvider: Send {
    /// # Errors
    ///
    /// `ContentTypeNotFound` for an unknown id.
    fn get(&self, id: ContentTypeId) -> Result<ContentType>;

    /// # Errors
    ///
    /// `ContentTypeAliasNotFound` for an unknown alias.
    fn get_by_alias(&self, alias: &str) -> Result<ContentType>;

    /// Insert (id 0) or replace a content type; returns it with its id
    ///
    /// # Errors
    ///
    /// `DuplicateContentTypeAlias` when another type already uses the alias.
    fn save(&mut self, content_type: ContentType) -> Result<ContentType>;
}

pub trait ScheduleProvider: Transactional + Send {
    fn get_schedule(&self, id: DocumentId) -> ContentSchedule;

    /// Replace the schedule of a document; an empty schedule removes it
    fn set_schedule(&mut self, id: DocumentId, schedule: ContentSchedule);

    /// Documents with an `action` entry due at `date`, by id
    fn due(&self, action: ScheduleAction, date: DateTime<Utc>) -> Vec<DocumentId>;
}

/// Receives one message per committed operation
pub trait CacheRefresher: Send {
    fn refresh(&mut self, message: CacheMessage);
}

pub trait AuditSink: Send {
    fn write(&mut self, entry: AuditEntry);
}

/// Drops every message
pub struct NoopCacheRefresher;

impl CacheRefresher for NoopCacheRefresher {
    fn refresh(&mut self, _: CacheMessage) {}
}

/// Drops every entry
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn write(&mut self, _: AuditEntry) {}
}
