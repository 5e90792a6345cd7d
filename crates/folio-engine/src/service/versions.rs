//! Version history housekeeping

use chrono::{DateTime, Utc};
use folio_core::errors::{FolioError, Result};
use folio_core::model::culture::WILDCARD;
use folio_core::model::{Document, Version};
use folio_core::notifications::{AuditEntry, AuditKind};
use folio_core::types::{DocumentId, VersionId};

use super::{ContentService, OperationOutcome, ScopeExit};

impl ContentService {
    /// History and current version, newest first
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub fn get_versions(&self, id: DocumentId) -> Result<Vec<Version>> {
        Ok(self.repository.get(id)?.versions())
    }

    /// Restore names and draft values from an earlier version, then save
    ///
    /// `culture` restores one culture of a variant document; `"*"` restores
    /// everything. Published values stay live until the next publish.
    ///
    /// # Errors
    ///
    /// `IllegalState` for a trashed document, `VersionNotFound` when
    /// `version_id` is not a version of the document, `CultureNotSupported`
    /// for a culture on an invariant document.
    pub fn rollback(
        &mut self,
        id: DocumentId,
        version_id: VersionId,
        culture: &str,
    ) -> Result<OperationOutcome<Document>> {
        self.run("rollback", id, |svc, batch| {
            let mut doc = svc.repository.get(id)?;
            if doc.trashed() {
                return Err(FolioError::IllegalState {
                    document_id: id,
                    action: "rollback".to_string(),
                    reason: "document is in the recycle bin".to_string(),
                });
            }
            let snapshot = doc
                .versions()
                .into_iter()
                .find(|v| v.id == version_id)
                .map(|v| v.snapshot)
                .ok_or_else(|| FolioError::VersionNotFound {
                    document_id: id,
                    version_id: version_id.to_string(),
                })?;

            let culture = Some(culture).filter(|c| c.trim() != WILDCARD);
            doc.restore_snapshot(&snapshot, culture)?;
            svc.save_impl(&mut doc, batch)?;
            batch.audit(
                AuditEntry::new(AuditKind::RollBack, id, "Rolled back").with_parameters(version_id.to_string()),
            );
            Ok((doc, ScopeExit::Complete))
        })
    }

    /// Delete one historical version, and with `delete_prior` every older one
    ///
    /// The current and the published version are never deleted. Returns the
    /// number of versions removed.
    ///
    /// # Errors
    ///
    /// `VersionNotFound` when `version_id` is not a version of the document.
    pub fn delete_version(
        &mut self,
        id: DocumentId,
        version_id: VersionId,
        delete_prior: bool,
    ) -> Result<OperationOutcome<usize>> {
        self.run("delete_version", id, |svc, batch| {
            let mut doc = svc.repository.get(id)?;
            let date = if doc.current_version_id == version_id {
                doc.update_date
            } else {
                doc.history
                    .iter()
                    .find(|v| v.id == version_id)
                    .map(|v| v.date)
                    .ok_or_else(|| FolioError::VersionNotFound {
                        document_id: id,
                        version_id: version_id.to_string(),
                    })?
            };

            let removed = svc.prune_history(&mut doc, |v| {
                v.id == version_id || (delete_prior && v.date < date)
            })?;
            batch.audit(AuditEntry::new(AuditKind::Delete, id, "Delete (by version)"));
            Ok((removed, ScopeExit::Complete))
        })
    }

    /// Delete historical versions older than `before`
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub fn delete_versions(&mut self, id: DocumentId, before: DateTime<Utc>) -> Result<OperationOutcome<usize>> {
        self.run("delete_versions", id, |svc, batch| {
            let mut doc = svc.repository.get(id)?;
            let removed = svc.prune_history(&mut doc, |v| v.date < before)?;
            batch.audit(AuditEntry::new(AuditKind::Delete, id, "Delete (by version date)"));
            Ok((removed, ScopeExit::Complete))
        })
    }

    /// Drop history entries matching `doomed`, sparing the current and
    /// published versions
    fn prune_history<F>(&mut self, doc: &mut Document, doomed: F) -> Result<usize>
    where
        F: Fn(&Version) -> bool,
    {
        let current = doc.current_version_id;
        let published = doc.published_version_id;
        let before = doc.history.len();
        doc.history
            .retain(|v| v.id == current || Some(v.id) == published || !doomed(v));
        let removed = before - doc.history.len();
        if removed > 0 {
            tracing::debug!(document_id = doc.id(), removed, "Pruned version history");
            self.repository.save(doc)?;
        }
        Ok(removed)
    }
}
