//! Tree operations: recycle bin, move, copy, delete, sort

use std::collections::HashMap;

use folio_core::cascade::{relocate_subtree, sort_plan, TransitionCode, Visibility};
use folio_core::errors::{FolioError, Result};
use folio_core::model::node::system_path;
use folio_core::model::{ContentSchedule, Document};
use folio_core::notifications::{AuditEntry, AuditKind, ChangeKind, MutationBatch};
use folio_core::publishing::strategy_unpublish;
use folio_core::types::{DocumentId, RECYCLE_BIN_ID, ROOT_ID};

use super::{ContentService, OperationOutcome, ScopeExit};

impl ContentService {
    /// The document followed by its descendants, pre-order
    fn subtree(&self, id: DocumentId) -> Result<Vec<Document>> {
        let mut nodes = vec![self.repository.get(id)?];
        nodes.extend(self.repository.descendants(id)?);
        Ok(nodes)
    }

    /// Move a subtree under the recycle bin
    ///
    /// Published flags are kept; trashed documents are masked.
    ///
    /// # Errors
    ///
    /// `IllegalState` when the document is already in the recycle bin.
    pub fn move_to_recycle_bin(&mut self, id: DocumentId) -> Result<OperationOutcome<()>> {
        self.run("move_to_recycle_bin", id, |svc, batch| {
            svc.trash_impl(id, batch)?;
            Ok(((), ScopeExit::Complete))
        })
    }

    fn trash_impl(&mut self, id: DocumentId, batch: &mut MutationBatch) -> Result<()> {
        let mut subtree = self.subtree(id)?;
        if subtree[0].trashed() {
            return Err(FolioError::IllegalState {
                document_id: id,
                action: "move to the recycle bin".to_string(),
                reason: "document is already in the recycle bin".to_string(),
            });
        }
        let sort_order = self.next_sort_order(RECYCLE_BIN_ID, Some(id))?;
        relocate_subtree(&mut subtree, RECYCLE_BIN_ID, &system_path(RECYCLE_BIN_ID), 0);
        subtree[0].node.sort_order = sort_order;

        for doc in &subtree {
            self.repository.save(doc)?;
            batch.refresh(doc.id(), TransitionCode::unchanged(doc.published, doc.published, false));
        }
        batch.payload(id, ChangeKind::RefreshBranch);
        batch.audit(AuditEntry::new(AuditKind::Move, id, "Moved to recycle bin"));
        Ok(())
    }

    /// Move a subtree under `parent_id`, after its new siblings
    ///
    /// Moving under `-20` trashes the subtree. A published document leaving
    /// the recycle bin is unpublished; its descendants keep their flags.
    ///
    /// # Errors
    ///
    /// `InvalidMoveTarget` when the target is missing, trashed, or the
    /// document itself or one of its descendants.
    pub fn move_to(&mut self, id: DocumentId, parent_id: DocumentId) -> Result<OperationOutcome<()>> {
        self.run("move", id, |svc, batch| {
            if parent_id == RECYCLE_BIN_ID {
                svc.trash_impl(id, batch)?;
                return Ok(((), ScopeExit::Complete));
            }

            let mut subtree = svc.subtree(id)?;
            let invalid = |reason: &str| FolioError::InvalidMoveTarget {
                document_id: id,
                target_id: parent_id,
                reason: reason.to_string(),
            };
            if parent_id != ROOT_ID {
                let target = svc
                    .repository
                    .get(parent_id)
                    .map_err(|_| invalid("target does not exist"))?;
                if target.trashed() {
                    return Err(invalid("target is in the recycle bin"));
                }
                if subtree[0].node.is_ancestor_or_self_of(&target.node) {
                    return Err(invalid("target is the document itself or one of its descendants"));
                }
            }

            let leaving_bin = subtree[0].trashed();
            let (path, level) = svc.parent_placement(parent_id)?;
            let sort_order = svc.next_sort_order(parent_id, Some(id))?;
            relocate_subtree(&mut subtree, parent_id, &path, level);
            subtree[0].node.sort_order = sort_order;

            let unpublished_root = leaving_bin && subtree[0].published;
            if unpublished_root {
                let languages = svc.languages.clone();
                let mut schedule = svc.schedules.get_schedule(id);
                strategy_unpublish(&mut subtree[0], &mut schedule, &languages, Self::now());
                svc.schedules.set_schedule(id, schedule);
            }

            let mut visibility = Visibility::new(parent_id, svc.parent_visible(parent_id)?);
            for (index, doc) in subtree.iter().enumerate() {
                svc.repository.save(doc)?;
                let visible = visibility.record(doc);
                let code = if index == 0 && unpublished_root {
                    TransitionCode::unpublished(true)
                } else {
                    TransitionCode::unchanged(doc.published, doc.published, visible)
                };
                batch.refresh(doc.id(), code);
            }
            batch.payload(id, ChangeKind::RefreshBranch);
            batch.audit(AuditEntry::new(AuditKind::Move, id, "Moved"));
            Ok(((), ScopeExit::Complete))
        })
    }

    /// Copy a subtree under `parent_id` and return the copy of `id`
    ///
    /// Copies get new ids and keys, no published state and no history, and
    /// are placed after the target's children.
    ///
    /// # Errors
    ///
    /// `ParentNotFound` for a missing target.
    pub fn copy(&mut self, id: DocumentId, parent_id: DocumentId) -> Result<OperationOutcome<Document>> {
        self.run("copy", id, |svc, batch| {
            let (path, level) = svc.parent_placement(parent_id)?;
            let sort_order = svc.next_sort_order(parent_id, None)?;
            let mut subtree = svc.subtree(id)?;

            let mut ids: HashMap<DocumentId, DocumentId> = HashMap::new();
            for doc in subtree.iter_mut() {
                let original = doc.id();
                doc.reset_for_copy();
                doc.node.id = svc.repository.next_id();
                if let Some(parent) = ids.get(&doc.parent_id()) {
                    doc.node.parent_id = *parent;
                }
                ids.insert(original, doc.id());
            }
            relocate_subtree(&mut subtree, parent_id, &path, level);
            subtree[0].node.sort_order = sort_order;

            for doc in &subtree {
                svc.repository.save(doc)?;
                batch.refresh(doc.id(), TransitionCode::unchanged(false, false, false));
            }
            let copy_id = subtree[0].id();
            batch.payload(copy_id, ChangeKind::RefreshBranch);
            batch.audit(
                AuditEntry::new(AuditKind::Copy, copy_id, "Copied").with_parameters(id.to_string()),
            );
            let copy = subtree.swap_remove(0);
            Ok((copy, ScopeExit::Complete))
        })
    }

    /// Delete a document and its descendants, deepest first
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub fn delete(&mut self, id: DocumentId) -> Result<OperationOutcome<usize>> {
        self.run("delete", id, |svc, batch| {
            let removed = svc.delete_subtree(id, batch)?;
            batch.audit(AuditEntry::new(AuditKind::Delete, id, "Deleted"));
            Ok((removed, ScopeExit::Complete))
        })
    }

    fn delete_subtree(&mut self, id: DocumentId, batch: &mut MutationBatch) -> Result<usize> {
        let subtree = self.subtree(id)?;
        for doc in subtree.iter().rev() {
            self.repository.delete(doc.id())?;
            self.schedules.set_schedule(doc.id(), ContentSchedule::new());
            batch.remove(doc.id());
        }
        batch.payload(id, ChangeKind::Remove);
        Ok(subtree.len())
    }

    /// Delete everything in the recycle bin; returns the number of documents removed
    pub fn empty_recycle_bin(&mut self) -> Result<OperationOutcome<usize>> {
        self.run("empty_recycle_bin", RECYCLE_BIN_ID, |svc, batch| {
            batch.payload(RECYCLE_BIN_ID, ChangeKind::RefreshNode);
            let mut removed = 0;
            for child in svc.repository.children(RECYCLE_BIN_ID)? {
                removed += svc.delete_subtree(child.id(), batch)?;
            }
            batch.audit(AuditEntry::new(AuditKind::Delete, RECYCLE_BIN_ID, "Recycle bin emptied"));
            Ok((removed, ScopeExit::Complete))
        })
    }

    /// Give `ids` the sort orders `0..n`
    ///
    /// Only siblings whose order changed are saved and announced, in their
    /// new order.
    ///
    /// # Errors
    ///
    /// `InvalidSort` when the ids do not share a parent or one is listed twice.
    pub fn sort(&mut self, ids: &[DocumentId]) -> Result<OperationOutcome<()>> {
        let first = ids.first().copied().unwrap_or(ROOT_ID);
        self.run("sort", first, |svc, batch| {
            if ids.is_empty() {
                return Ok(((), ScopeExit::Complete));
            }
            let parent_id = svc.repository.get(first)?.parent_id();
            let mut current = Vec::new();
            for doc in svc.repository.children(parent_id)? {
                current.push((doc.id(), doc.node.sort_order));
            }
            if let Some(stray) = ids.iter().find(|id| !current.iter().any(|(c, _)| c == *id)) {
                return Err(FolioError::InvalidSort {
                    reason: format!("document {} is not a child of {}", stray, parent_id),
                });
            }

            let plan = sort_plan(&current, ids)?;
            if plan.is_empty() {
                return Ok(((), ScopeExit::Complete));
            }
            for (id, sort_order) in plan {
                let mut doc = svc.repository.get(id)?;
                doc.node.sort_order = sort_order;
                svc.repository.save(&doc)?;
                let path_published = svc.path_published(&doc)?;
                batch.refresh(id, TransitionCode::unchanged(doc.published, doc.published, path_published));
                batch.payload(id, ChangeKind::RefreshNode);
            }
            batch.audit(AuditEntry::new(AuditKind::Sort, parent_id, "Sorted"));
            Ok(((), ScopeExit::Complete))
        })
    }
}
