//! Create, save and content-type changes

use folio_core::cascade::TransitionCode;
use folio_core::errors::{FolioError, Result};
use folio_core::model::{ContentType, Document};
use folio_core::normalize::normalize;
use folio_core::notifications::{AuditEntry, AuditKind, ChangeKind, MutationBatch};
use folio_core::types::{DocumentId, RECYCLE_BIN_ID};

use super::{ContentService, OperationOutcome, ScopeExit};

impl ContentService {
    /// A new, unsaved document of the content type `alias` under `parent_id`
    ///
    /// # Errors
    ///
    /// `ContentTypeAliasNotFound` for an unknown alias.
    pub fn create(&self, name: &str, parent_id: DocumentId, alias: &str) -> Result<Document> {
        let content_type = self.content_types.get_by_alias(alias)?;
        Ok(Document::new(&content_type, parent_id, name))
    }

    /// Persist draft names and values
    ///
    /// Published values are never touched. On success `doc` holds the stored
    /// state (identity, placement, edited flags).
    ///
    /// # Errors
    ///
    /// `PendingPublishMarks` when the document carries publish marks,
    /// `EmptyName`/`NameTooLong`, `ParentNotFound` for a new document under a
    /// missing parent.
    pub fn save(&mut self, doc: &mut Document) -> Result<OperationOutcome<()>> {
        let mut working = doc.clone();
        let outcome = self.run("save", doc.id(), |svc, batch| {
            svc.save_impl(&mut working, batch)?;
            Ok(((), ScopeExit::Complete))
        })?;
        *doc = working;
        Ok(outcome)
    }

    pub(super) fn save_impl(&mut self, working: &mut Document, batch: &mut MutationBatch) -> Result<()> {
        if working.has_pending_marks() {
            return Err(FolioError::PendingPublishMarks {
                document_id: working.id(),
            });
        }
        self.content_type_of(working)?;
        let stored = self.stored(working)?;
        self.prepare(working, stored.as_ref())?;
        self.repository.save(working)?;

        let path_published = self.path_published(working)?;
        batch.refresh(
            working.id(),
            TransitionCode::unchanged(working.published, working.published, path_published),
        );
        batch.payload(working.id(), ChangeKind::RefreshNode);
        batch.audit(self.save_audit(working, stored.as_ref()));
        Ok(())
    }

    /// Stored copy of `doc`, `None` for a document that was never saved
    pub(super) fn stored(&self, doc: &Document) -> Result<Option<Document>> {
        if doc.has_identity() {
            self.repository.get(doc.id()).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Bring `doc` in line with its stored state before it is written
    ///
    /// Placement, history and the persisted publish flag always come from
    /// the stored copy. New documents get an id, a path and the next sort
    /// order among their siblings.
    pub(super) fn prepare(&mut self, doc: &mut Document, stored: Option<&Document>) -> Result<()> {
        match stored {
            Some(stored) => {
                doc.node = stored.node.clone();
                doc.history = stored.history.clone();
                doc.current_version_id = stored.current_version_id;
                doc.published_version_id = stored.published_version_id;
                doc.published = stored.published;
                doc.publish_date = stored.publish_date;
            }
            None => {
                let parent_id = doc.parent_id();
                let (path, level) = self.parent_placement(parent_id)?;
                let sort_order = self.next_sort_order(parent_id, None)?;
                doc.node.id = self.repository.next_id();
                doc.node.place_under(parent_id, &path, level);
                doc.node.sort_order = sort_order;
                doc.node.trashed = path.contains(&RECYCLE_BIN_ID);
            }
        }

        let default = self.default_culture();
        doc.ensure_name(default.as_deref(), self.settings.content.max_name_length)?;
        doc.update_date = Self::now();
        doc.recompute_edited(default.as_deref());
        Ok(())
    }

    pub(super) fn save_audit(&self, doc: &Document, stored: Option<&Document>) -> AuditEntry {
        if doc.varies_by_culture() {
            let changed = doc.cultures_changed_since(stored);
            if !changed.is_empty() {
                return AuditEntry::new(AuditKind::SaveVariant, doc.id(), "Saved languages")
                    .with_parameters(self.language_names(&changed));
            }
        }
        AuditEntry::new(AuditKind::Save, doc.id(), "Saved")
    }

    /// Save a content type and normalize every document using it
    ///
    /// Documents whose variation changed are re-saved with their edited
    /// flags recomputed from the normalized values.
    ///
    /// # Errors
    ///
    /// `DuplicateContentTypeAlias` when another type uses the alias.
    pub fn save_content_type(&mut self, content_type: ContentType) -> Result<OperationOutcome<ContentType>> {
        self.run("save_content_type", content_type.id, |svc, batch| {
            let saved = svc.content_types.save(content_type)?;
            let default = svc.default_culture();
            for mut doc in svc.repository.by_content_type(saved.id)? {
                if !normalize(&mut doc, &saved, default.as_deref()) {
                    continue;
                }
                tracing::debug!(document_id = doc.id(), content_type = %saved.alias, "Normalized document");
                svc.repository.save(&doc)?;
                let path_published = svc.path_published(&doc)?;
                batch.refresh(
                    doc.id(),
                    TransitionCode::unchanged(doc.published, doc.published, path_published),
                );
                batch.payload(doc.id(), ChangeKind::RefreshNode);
            }
            Ok((saved, ScopeExit::Complete))
        })
    }
}
