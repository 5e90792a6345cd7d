//! Publishing operations
//!
//! Single-document publishing goes through `commit_impl`, which applies the
//! pending marks on a document, saves it whatever the outcome and works out
//! the change event, cache payload and audit entries. Branch publishing and
//! scheduled publishing reuse it per document.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use folio_core::cascade::{decide, BranchDecision, TransitionCode, Visibility};
use folio_core::errors::{FolioError, Result};
use folio_core::model::culture::{canonical_culture, WILDCARD};
use folio_core::model::{ContentSchedule, CultureSelection, Document, PublishedState, ScheduleAction};
use folio_core::notifications::{AuditEntry, AuditKind, ChangeKind, MutationBatch};
use folio_core::publishing::{
    apply_culture_unpublish, can_publish, strategy_publish, strategy_unpublish, PublishCheck,
    PublishResult, PublishResultType,
};
use folio_core::types::DocumentId;
use folio_core::{log_op_end, log_op_start};

use super::{ContentService, OperationOutcome, ScopeExit};

/// What committing one document produced
pub(super) struct Commit {
    pub result: PublishResult,
    /// `None` when the document was left unsaved (a failing branch item)
    pub code: Option<TransitionCode>,
    pub payload: ChangeKind,
    pub audit: Vec<AuditEntry>,
}

impl Commit {
    fn record(self, batch: &mut MutationBatch, id: DocumentId) -> PublishResult {
        if let Some(code) = self.code {
            batch.refresh(id, code);
            batch.payload(id, self.payload);
        }
        for entry in self.audit {
            batch.audit(entry);
        }
        self.result
    }
}

impl ContentService {
    /// Save `doc` and publish the selected cultures
    ///
    /// The save is kept when the publish fails. Invariant documents accept
    /// only `CultureSelection::All`; a variant document with an empty
    /// selection is saved and reported `FailedPublishNothingToPublish`.
    ///
    /// # Errors
    ///
    /// `CultureNotSupported` for cultures on an invariant document,
    /// `InvalidCulture` for an empty code or `"*"` inside a list, plus the
    /// structural errors of `save`.
    pub fn save_and_publish(
        &mut self,
        doc: &mut Document,
        selection: CultureSelection,
    ) -> Result<OperationOutcome<PublishResult>> {
        let mut working = doc.clone();
        let outcome = self.run("save_and_publish", doc.id(), |svc, batch| {
            if !working.varies_by_culture() {
                if let CultureSelection::Only(codes) = &selection {
                    if !codes.is_empty() {
                        return Err(FolioError::CultureNotSupported {
                            document_id: working.id(),
                            culture: codes.join(","),
                        });
                    }
                }
                working.publish_culture(WILDCARD)?;
            } else {
                match selection.canonical()? {
                    None => working.publish_culture(WILDCARD)?,
                    Some(cultures) => {
                        for culture in &cultures {
                            working.publish_culture(culture)?;
                        }
                    }
                }
            }
            let result = svc.commit_impl(&mut working, None)?.record(batch, working.id());
            Ok((result, ScopeExit::Complete))
        })?;
        *doc = working;
        Ok(outcome)
    }

    /// Apply the publish/unpublish marks set on `doc` in one operation
    ///
    /// # Errors
    ///
    /// Structural errors of `save`.
    pub fn commit_document_changes(&mut self, doc: &mut Document) -> Result<OperationOutcome<PublishResult>> {
        let mut working = doc.clone();
        let outcome = self.run("commit_document_changes", doc.id(), |svc, batch| {
            let result = svc.commit_impl(&mut working, None)?.record(batch, working.id());
            Ok((result, ScopeExit::Complete))
        })?;
        *doc = working;
        Ok(outcome)
    }

    /// Unpublish one culture, or the whole document with `"*"`
    ///
    /// A document (or culture) that is not published is saved and reported
    /// `SuccessUnpublishAlready`.
    ///
    /// # Errors
    ///
    /// `CultureNotSupported` for a culture on an invariant document,
    /// `InvalidCulture` for an empty code.
    pub fn unpublish(&mut self, doc: &mut Document, culture: &str) -> Result<OperationOutcome<PublishResult>> {
        let mut working = doc.clone();
        let outcome = self.run("unpublish", doc.id(), |svc, batch| {
            let stored = svc.stored(&working)?;
            let published = stored.as_ref().map(|d| d.published).unwrap_or(false);

            let marked = if culture.trim() == WILDCARD {
                if published {
                    working.mark_unpublishing();
                }
                published
            } else {
                if !working.varies_by_culture() {
                    return Err(FolioError::CultureNotSupported {
                        document_id: working.id(),
                        culture: culture.to_string(),
                    });
                }
                let code = canonical_culture(culture)?;
                let culture_published = stored
                    .as_ref()
                    .map(|d| d.is_culture_published(&code))
                    .unwrap_or(false);
                if published && culture_published {
                    working.unpublish_culture(&code)?;
                }
                published && culture_published
            };

            if !marked {
                svc.save_impl(&mut working, batch)?;
                let result = PublishResult::new(PublishResultType::SuccessUnpublishAlready, working.id());
                return Ok((result, ScopeExit::Complete));
            }
            let result = svc.commit_impl(&mut working, None)?.record(batch, working.id());
            Ok((result, ScopeExit::Complete))
        })?;
        *doc = working;
        Ok(outcome)
    }

    /// Commit the pending marks of `working`
    ///
    /// `branch` is `Some(is_root)` inside a branch publish: the path is only
    /// checked on the branch root, and a failing non-root document is left
    /// unsaved.
    pub(super) fn commit_impl(&mut self, working: &mut Document, branch: Option<bool>) -> Result<Commit> {
        let stored = self.stored(working)?;
        let is_new = stored.is_none();
        let was_published = stored.as_ref().map(|d| d.published).unwrap_or(false);
        let state = working.published_state();
        let pending = working.pending().clone();
        let content_type = self.content_type_of(working)?;
        self.prepare(working, stored.as_ref())?;

        let id = working.id();
        let now = Self::now();
        let languages = self.languages.clone();
        let mut schedule = self.schedules.get_schedule(id);

        let result = match state {
            PublishedState::Publishing => {
                let path_publishable = match branch {
                    Some(false) => None,
                    _ => Some(self.path_publishable(working)?),
                };
                let check = PublishCheck {
                    languages: &languages,
                    schedule: &schedule,
                    now,
                    path_publishable,
                };
                let checked = can_publish(working, &content_type, &check);
                if checked.is_success() {
                    match strategy_publish(working, &languages, now) {
                        PublishResultType::SuccessUnpublishCulture
                            if working.cultures.published().is_empty() =>
                        {
                            strategy_unpublish(working, &mut schedule, &languages, now);
                            PublishResult::new(PublishResultType::SuccessUnpublishLastCulture, id)
                        }
                        applied => PublishResult::new(applied, id),
                    }
                } else if checked.result == PublishResultType::FailedPublishMandatoryCultureMissing
                    && working.published
                {
                    apply_culture_unpublish(working);
                    strategy_unpublish(working, &mut schedule, &languages, now);
                    PublishResult::new(PublishResultType::SuccessUnpublishMandatoryCulture, id)
                } else if branch == Some(false) {
                    return Ok(Commit {
                        result: checked,
                        code: None,
                        payload: ChangeKind::RefreshNode,
                        audit: Vec::new(),
                    });
                } else {
                    working.clear_pending();
                    checked
                }
            }
            PublishedState::Unpublishing => {
                PublishResult::new(strategy_unpublish(working, &mut schedule, &languages, now), id)
            }
            _ => PublishResult::new(PublishResultType::FailedPublishNothingToPublish, id),
        };

        self.repository.save(working)?;
        self.schedules.set_schedule(id, schedule);

        use PublishResultType as R;
        let (code, payload) = match result.result {
            R::SuccessPublish | R::SuccessPublishCulture | R::SuccessMixedCulture | R::SuccessUnpublishCulture => {
                let parent_visible = self.parent_visible(working.parent_id())?;
                let payload = if !is_new && !was_published {
                    ChangeKind::RefreshBranch
                } else {
                    ChangeKind::RefreshNode
                };
                (TransitionCode::published(was_published, parent_visible), payload)
            }
            R::SuccessUnpublish | R::SuccessUnpublishLastCulture | R::SuccessUnpublishMandatoryCulture => {
                (TransitionCode::unpublished(was_published), ChangeKind::RefreshBranch)
            }
            _ => {
                let path_published = self.path_published(working)?;
                let payload = if is_new {
                    ChangeKind::RefreshNode
                } else {
                    ChangeKind::RefreshBranch
                };
                (
                    TransitionCode::unchanged(was_published, working.published, path_published),
                    payload,
                )
            }
        };

        let audit = match result.result {
            R::SuccessPublish => vec![AuditEntry::new(AuditKind::Publish, id, "Published")],
            R::SuccessPublishCulture => vec![self.published_languages(id, &pending.publishing)],
            R::SuccessUnpublishCulture => vec![self.unpublished_languages(id, &pending.unpublishing)],
            R::SuccessMixedCulture => vec![
                self.published_languages(id, &pending.publishing),
                self.unpublished_languages(id, &pending.unpublishing),
            ],
            R::SuccessUnpublishLastCulture => vec![
                self.unpublished_languages(id, &pending.unpublishing),
                AuditEntry::new(AuditKind::Unpublish, id, "Unpublished (last language unpublished)"),
            ],
            R::SuccessUnpublishMandatoryCulture => {
                let mut entries = Vec::new();
                if !pending.unpublishing.is_empty() {
                    entries.push(self.unpublished_languages(id, &pending.unpublishing));
                }
                entries.push(AuditEntry::new(
                    AuditKind::Unpublish,
                    id,
                    "Unpublished (mandatory language unpublished)",
                ));
                entries
            }
            R::SuccessUnpublish => vec![AuditEntry::new(AuditKind::Unpublish, id, "Unpublished")],
            _ => vec![self.save_audit(working, stored.as_ref())],
        };

        Ok(Commit {
            result,
            code: Some(code),
            payload,
            audit,
        })
    }

    fn published_languages(&self, id: DocumentId, cultures: &BTreeSet<String>) -> AuditEntry {
        AuditEntry::new(AuditKind::PublishVariant, id, "Published languages")
            .with_parameters(self.language_names(cultures))
    }

    fn unpublished_languages(&self, id: DocumentId, cultures: &BTreeSet<String>) -> AuditEntry {
        AuditEntry::new(AuditKind::UnpublishVariant, id, "Unpublished languages")
            .with_parameters(self.language_names(cultures))
    }

    // ===== Branch =====

    /// Publish `root` and its descendants, pre-order
    ///
    /// Published documents are republished when edited; unpublished ones are
    /// only published on the root or when `force` is set. A failing document
    /// cuts its subtree; a failing root rolls the whole operation back.
    ///
    /// # Errors
    ///
    /// `BranchPublishNewDocument` for an unsaved root, `PendingPublishMarks`
    /// when the root carries marks, `InvalidCulture` for a bad selection.
    pub fn publish_branch(
        &mut self,
        root: &Document,
        force: bool,
        selection: CultureSelection,
    ) -> Result<OperationOutcome<Vec<PublishResult>>> {
        self.run("publish_branch", root.id(), |svc, batch| {
            if !root.has_identity() {
                return Err(FolioError::BranchPublishNewDocument);
            }
            if root.has_pending_marks() {
                return Err(FolioError::PendingPublishMarks {
                    document_id: root.id(),
                });
            }

            let root_id = root.id();
            let mut head = root.clone();
            let stored = svc.repository.get(root_id)?;
            svc.prepare(&mut head, Some(&stored))?;
            let mut nodes = vec![head];
            nodes.extend(svc.repository.descendants(root_id)?);

            let root_parent = nodes[0].parent_id();
            let mut visibility = Visibility::new(root_parent, svc.parent_visible(root_parent)?);
            let mut excluded: HashSet<DocumentId> = HashSet::new();
            let mut results = Vec::new();

            for (index, mut doc) in nodes.into_iter().enumerate() {
                let is_root = index == 0;
                if excluded.contains(&doc.parent_id()) {
                    excluded.insert(doc.id());
                    continue;
                }
                match decide(&doc, is_root, force, &selection)? {
                    BranchDecision::Exclude if is_root => {
                        results.push(PublishResult::new(
                            PublishResultType::FailedPublishNothingToPublish,
                            doc.id(),
                        ));
                        return Ok((results, ScopeExit::Rollback));
                    }
                    BranchDecision::Exclude => {
                        excluded.insert(doc.id());
                    }
                    BranchDecision::AlreadyPublished => {
                        visibility.record(&doc);
                        results.push(PublishResult::new(
                            PublishResultType::SuccessPublishAlready,
                            doc.id(),
                        ));
                    }
                    BranchDecision::Publish(cultures) => {
                        if doc.varies_by_culture() {
                            for culture in &cultures {
                                doc.publish_culture(culture)?;
                            }
                        } else {
                            doc.publish_culture(WILDCARD)?;
                        }
                        let was_published = doc.published;
                        let commit = svc.commit_impl(&mut doc, Some(is_root))?;
                        let success = commit.result.is_success();
                        results.push(commit.result);
                        if !success {
                            if is_root {
                                return Ok((results, ScopeExit::Rollback));
                            }
                            excluded.insert(doc.id());
                            continue;
                        }
                        let code = if doc.published {
                            TransitionCode::published(was_published, visibility.parent_visible(&doc))
                        } else {
                            TransitionCode::unpublished(was_published)
                        };
                        visibility.record(&doc);
                        batch.refresh(doc.id(), code);
                    }
                }
            }

            batch.payload(root_id, ChangeKind::RefreshBranch);
            batch.audit(AuditEntry::new(AuditKind::Publish, root_id, "Branch published"));
            Ok((results, ScopeExit::Complete))
        })
    }

    // ===== Schedules =====

    pub fn schedule(&self, id: DocumentId) -> ContentSchedule {
        self.schedules.get_schedule(id)
    }

    /// Replace the release/expire schedule of a document
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub fn set_schedule(&mut self, id: DocumentId, schedule: ContentSchedule) -> Result<()> {
        if !self.repository.exists(id) {
            return Err(FolioError::DocumentNotFound { document_id: id });
        }
        self.schedules.set_schedule(id, schedule);
        Ok(())
    }

    /// Run every release, then every expiration, due at `date`
    ///
    /// Each document is handled in its own scope; a failure is logged and
    /// does not stop the run.
    pub fn perform_scheduled_publish(&mut self, date: DateTime<Utc>) -> Vec<PublishResult> {
        log_op_start!("perform_scheduled_publish");
        let start = std::time::Instant::now();
        let mut results = Vec::new();

        for action in [ScheduleAction::Release, ScheduleAction::Expire] {
            for id in self.schedules.due(action, date) {
                let outcome = self.run_scoped(|svc, batch| svc.scheduled_item(id, action, date, batch));
                match outcome {
                    Ok(outcome) => {
                        let result = outcome.value;
                        if !result.is_success() {
                            tracing::error!(
                                document_id = id,
                                result = %result.result,
                                "Failed to run scheduled {:?} of document {}: {}",
                                action,
                                id,
                                result.result.reason()
                            );
                        }
                        results.push(result);
                    }
                    Err(e) => {
                        tracing::error!(document_id = id, error = %e, "Scheduled {:?} failed", action);
                    }
                }
            }
        }

        log_op_end!(
            "perform_scheduled_publish",
            duration_ms = start.elapsed().as_millis() as u64,
            node_count = results.len() as u64
        );
        results
    }

    fn scheduled_item(
        &mut self,
        id: DocumentId,
        action: ScheduleAction,
        date: DateTime<Utc>,
        batch: &mut MutationBatch,
    ) -> Result<(PublishResult, ScopeExit)> {
        let mut doc = self.repository.get(id)?;
        let mut schedule = self.schedules.get_schedule(id);
        let due = schedule.pending(action, date);
        schedule.clear_pending(action, date);
        self.schedules.set_schedule(id, schedule);

        let cultures: Vec<&str> = due.iter().filter_map(|e| e.culture.as_deref()).collect();
        match action {
            ScheduleAction::Release => {
                if doc.trashed() {
                    let result = PublishResult::new(PublishResultType::FailedPublishIsTrashed, id);
                    return Ok((result, ScopeExit::Complete));
                }
                if doc.varies_by_culture() {
                    for culture in cultures {
                        doc.publish_culture(culture)?;
                    }
                } else {
                    doc.publish_culture(WILDCARD)?;
                }
            }
            ScheduleAction::Expire => {
                if doc.varies_by_culture() {
                    for culture in cultures {
                        doc.unpublish_culture(culture)?;
                    }
                } else if doc.published {
                    doc.mark_unpublishing();
                }
                let nothing_marked = match doc.published_state() {
                    PublishedState::Unpublishing => false,
                    _ => doc.pending().unpublishing.is_empty(),
                };
                if !doc.published || nothing_marked {
                    doc.clear_pending();
                    let result = PublishResult::new(PublishResultType::SuccessUnpublishAlready, id);
                    return Ok((result, ScopeExit::Complete));
                }
            }
        }

        let result = self.commit_impl(&mut doc, None)?.record(batch, id);
        Ok((result, ScopeExit::Complete))
    }
}
