//! Content service
//!
//! ## Logging Ownership
//!
//! The service owns lifecycle logging for every public operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Core and store layers use only plain `tracing` calls for internal details.
//!
//! Each call gets a `RequestContext`; its request id (and trace id, when
//! set) is logged at start and end and attached to the `ExError` logged on
//! failure.
//!
//! ## Scopes
//!
//! Each operation opens one scope on the repository and the schedule book.
//! Errors roll the scope back. A branch publish whose root fails also rolls
//! back, without an error. Change events, the cache message and audit entries
//! are collected in a `MutationBatch` and dispatched only after the scope
//! completed. Inside `ContentService::scope` operations join the caller's
//! scope instead and their batches are appended to it.

mod publish;
mod save;
mod tree;
mod versions;

use chrono::{DateTime, Utc};
use folio_core::collaborators::{
    AuditSink, CacheRefresher, ContentRepository, ContentTypeProvider, NoopAuditSink,
    NoopCacheRefresher, ScheduleProvider,
};
use folio_core::errors::{ExError, FolioError, Result};
use folio_core::model::language::{default_culture, display_names};
use folio_core::model::node::system_path;
use folio_core::model::{ContentType, Document, Language};
use folio_core::notifications::{CacheMessage, ChangeEvent, MutationBatch};
use folio_core::publishing;
use folio_core::settings::{LanguageSettings, Settings};
use folio_core::types::{DocumentId, RequestContext, TraceId, RECYCLE_BIN_ID, ROOT_ID};
use folio_core::{log_op_end, log_op_error, log_op_start};
use folio_store::{ContentTypeRegistry, MemoryContentRepository, ScheduleBook};
use serde::Serialize;

/// Storage, scheduling, cache and audit implementations a service runs on
pub struct Collaborators {
    pub repository: Box<dyn ContentRepository>,
    pub content_types: Box<dyn ContentTypeProvider>,
    pub schedules: Box<dyn ScheduleProvider>,
    pub cache: Box<dyn CacheRefresher>,
    pub audit: Box<dyn AuditSink>,
}

impl Collaborators {
    /// In-memory stores; cache messages and audit entries are dropped
    pub fn in_memory() -> Self {
        Self {
            repository: Box::new(MemoryContentRepository::new()),
            content_types: Box::new(ContentTypeRegistry::new()),
            schedules: Box::new(ScheduleBook::new()),
            cache: Box::new(NoopCacheRefresher),
            audit: Box::new(NoopAuditSink),
        }
    }
}

/// Result of a committed (or rolled back) operation
///
/// A rolled back operation reports no events and an empty message.
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome<T> {
    pub value: T,
    pub events: Vec<ChangeEvent>,
    pub message: CacheMessage,
}

impl<T> OperationOutcome<T> {
    fn rolled_back(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
            message: CacheMessage::default(),
        }
    }

    /// Events rendered as `id.code`, in emission order
    pub fn event_codes(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

/// How an operation leaves its scope when it did not fail
pub(crate) enum ScopeExit {
    Complete,
    Rollback,
}

/// A scope held open by `ContentService::scope`
struct OpenScope {
    context: RequestContext,
    batch: MutationBatch,
    /// Set when an operation inside failed or rolled back
    doomed: bool,
}

impl OpenScope {
    fn new(context: RequestContext) -> Self {
        Self {
            context,
            batch: MutationBatch::new(),
            doomed: false,
        }
    }
}

pub struct ContentService {
    settings: Settings,
    languages: Vec<Language>,
    repository: Box<dyn ContentRepository>,
    content_types: Box<dyn ContentTypeProvider>,
    schedules: Box<dyn ScheduleProvider>,
    cache: Box<dyn CacheRefresher>,
    audit: Box<dyn AuditSink>,
    trace_id: Option<TraceId>,
    ambient: Option<OpenScope>,
}

impl ContentService {
    /// # Errors
    ///
    /// `InvalidConfig` / `InvalidCulture` when the settings do not validate.
    pub fn new(settings: Settings, collaborators: Collaborators) -> Result<Self> {
        settings.validate()?;
        let languages = settings.languages()?;
        Ok(Self {
            settings,
            languages,
            repository: collaborators.repository,
            content_types: collaborators.content_types,
            schedules: collaborators.schedules,
            cache: collaborators.cache,
            audit: collaborators.audit,
            trace_id: None,
            ambient: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Replace the configured languages
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the new language list does not validate.
    pub fn set_languages(&mut self, languages: Vec<LanguageSettings>) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.languages = languages;
        settings.validate()?;
        self.languages = settings.languages()?;
        self.settings = settings;
        Ok(())
    }

    pub fn get_by_id(&self, id: DocumentId) -> Result<Document> {
        self.repository.get(id)
    }

    /// Direct children of a document, the root (`-1`) or the recycle bin (`-20`)
    pub fn children(&self, parent_id: DocumentId) -> Result<Vec<Document>> {
        self.repository.children(parent_id)
    }

    /// Every document below `id`, pre-order
    pub fn descendants(&self, id: DocumentId) -> Result<Vec<Document>> {
        self.repository.descendants(id)
    }

    pub fn content_type(&self, alias: &str) -> Result<ContentType> {
        self.content_types.get_by_alias(alias)
    }

    /// Published, not trashed, and every ancestor likewise
    pub fn is_path_published(&self, id: DocumentId) -> Result<bool> {
        let doc = self.repository.get(id)?;
        self.path_published(&doc)
    }

    /// Top-level, or under a path-published parent
    pub fn is_path_publishable(&self, id: DocumentId) -> Result<bool> {
        let doc = self.repository.get(id)?;
        self.path_publishable(&doc)
    }

    // ===== Operation plumbing =====

    /// Tag the request contexts of later calls with `trace_id`
    pub fn set_trace_id(&mut self, trace_id: Option<TraceId>) {
        self.trace_id = trace_id;
    }

    /// Run several operations in one caller-held scope
    ///
    /// Operations called on `svc` inside `f` share one repository scope and
    /// one request id. Their change events, cache payloads and audit entries
    /// are appended in call order and dispatched once, as a single cache
    /// message, after the scope completed. An operation that fails or rolls
    /// back inside `f` rolls the whole scope back, even when `f` ignores the
    /// error.
    ///
    /// # Errors
    ///
    /// `ScopeAlreadyOpen` when called from inside another scope; otherwise
    /// whatever `f` returns.
    pub fn scope<T, F>(&mut self, f: F) -> Result<OperationOutcome<T>>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.ambient.is_some() {
            return Err(FolioError::ScopeAlreadyOpen);
        }
        let ctx = self.new_context();
        self.run_with(ctx.clone(), "scope", ROOT_ID, move |svc, batch| {
            svc.ambient = Some(OpenScope::new(ctx));
            let result = f(svc);
            let open = svc.ambient.take();
            let value = result?;
            let Some(open) = open else {
                return Err(FolioError::NoActiveScope);
            };
            batch.extend(open.batch);
            let exit = if open.doomed {
                ScopeExit::Rollback
            } else {
                ScopeExit::Complete
            };
            Ok((value, exit))
        })
    }

    fn new_context(&self) -> RequestContext {
        let ctx = RequestContext::new();
        match &self.trace_id {
            Some(trace_id) => ctx.with_trace_id(trace_id.clone()),
            None => ctx,
        }
    }

    fn run<T, F>(&mut self, op: &'static str, document_id: DocumentId, f: F) -> Result<OperationOutcome<T>>
    where
        F: FnOnce(&mut Self, &mut MutationBatch) -> Result<(T, ScopeExit)>,
    {
        let ctx = match &self.ambient {
            Some(open) => open.context.clone(),
            None => self.new_context(),
        };
        self.run_with(ctx, op, document_id, f)
    }

    fn run_with<T, F>(
        &mut self,
        ctx: RequestContext,
        op: &'static str,
        document_id: DocumentId,
        f: F,
    ) -> Result<OperationOutcome<T>>
    where
        F: FnOnce(&mut Self, &mut MutationBatch) -> Result<(T, ScopeExit)>,
    {
        let trace_id = ctx.trace_id.as_ref().map(TraceId::as_str).unwrap_or_default();
        log_op_start!(
            op,
            document_id = document_id,
            request_id = ctx.request_id.as_str(),
            trace_id = trace_id
        );
        let start = std::time::Instant::now();

        let outcome = self.run_scoped(f).map_err(|e| {
            log_op_error!(
                op,
                ExError::from(e.clone()).with_op(op).with_context(&ctx),
                duration_ms = start.elapsed().as_millis() as u64,
                document_id = document_id
            );
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            document_id = document_id,
            node_count = outcome.events.len() as u64,
            request_id = ctx.request_id.as_str(),
            trace_id = trace_id
        );
        Ok(outcome)
    }

    fn run_scoped<T, F>(&mut self, f: F) -> Result<OperationOutcome<T>>
    where
        F: FnOnce(&mut Self, &mut MutationBatch) -> Result<(T, ScopeExit)>,
    {
        if self.ambient.is_some() {
            return self.run_in_ambient(f);
        }

        self.repository.begin_scope()?;
        if let Err(e) = self.schedules.begin_scope() {
            self.repository.rollback_scope().ok();
            return Err(e);
        }

        let mut batch = MutationBatch::new();
        match f(self, &mut batch) {
            Ok((value, ScopeExit::Complete)) => {
                self.repository.complete_scope()?;
                self.schedules.complete_scope()?;
                batch.dispatch(self.cache.as_mut(), self.audit.as_mut());
                Ok(OperationOutcome {
                    value,
                    events: batch.events,
                    message: batch.message,
                })
            }
            Ok((value, ScopeExit::Rollback)) => {
                self.rollback_scopes();
                Ok(OperationOutcome::rolled_back(value))
            }
            Err(e) => {
                self.rollback_scopes();
                Err(e)
            }
        }
    }

    /// Run inside the caller-held scope: no scope of its own, no dispatch
    fn run_in_ambient<T, F>(&mut self, f: F) -> Result<OperationOutcome<T>>
    where
        F: FnOnce(&mut Self, &mut MutationBatch) -> Result<(T, ScopeExit)>,
    {
        let mut batch = MutationBatch::new();
        let result = f(self, &mut batch);
        let Some(open) = self.ambient.as_mut() else {
            return Err(FolioError::NoActiveScope);
        };
        match result {
            Ok((value, ScopeExit::Complete)) => {
                let outcome = OperationOutcome {
                    value,
                    events: batch.events.clone(),
                    message: batch.message.clone(),
                };
                open.batch.extend(batch);
                Ok(outcome)
            }
            Ok((value, ScopeExit::Rollback)) => {
                open.doomed = true;
                Ok(OperationOutcome::rolled_back(value))
            }
            Err(e) => {
                open.doomed = true;
                Err(e)
            }
        }
    }

    fn rollback_scopes(&mut self) {
        if let Err(e) = self.repository.rollback_scope() {
            tracing::error!(error = %e, "Failed to roll back content scope");
        }
        if let Err(e) = self.schedules.rollback_scope() {
            tracing::error!(error = %e, "Failed to roll back schedule scope");
        }
    }

    // ===== Shared helpers =====

    fn default_culture(&self) -> Option<String> {
        default_culture(&self.languages).map(str::to_string)
    }

    fn language_names<'a, I>(&self, cultures: I) -> String
    where
        I: IntoIterator<Item = &'a String>,
    {
        display_names(&self.languages, cultures)
    }

    fn content_type_of(&self, doc: &Document) -> Result<ContentType> {
        self.content_types.get(doc.content_type_id)
    }

    fn path_published(&self, doc: &Document) -> Result<bool> {
        publishing::is_path_published(doc, |id| self.repository.get(id))
    }

    fn path_publishable(&self, doc: &Document) -> Result<bool> {
        publishing::is_path_publishable(doc, |id| self.repository.get(id))
    }

    /// Whether children placed under `parent_id` would be visible
    fn parent_visible(&self, parent_id: DocumentId) -> Result<bool> {
        match parent_id {
            ROOT_ID => Ok(true),
            RECYCLE_BIN_ID => Ok(false),
            id => {
                let parent = self.repository.get(id)?;
                self.path_published(&parent)
            }
        }
    }

    /// Path and level of a parent, which may be the root or the recycle bin
    fn parent_placement(&self, parent_id: DocumentId) -> Result<(Vec<DocumentId>, u32)> {
        if parent_id == ROOT_ID || parent_id == RECYCLE_BIN_ID {
            return Ok((system_path(parent_id), 0));
        }
        let parent = self
            .repository
            .get(parent_id)
            .map_err(|_| FolioError::ParentNotFound { parent_id })?;
        Ok((parent.node.path.clone(), parent.node.level))
    }

    /// Sort order that places a child after its siblings
    ///
    /// `moving` is left out of the siblings, so a document moved under its
    /// current parent does not count itself.
    fn next_sort_order(&self, parent_id: DocumentId, moving: Option<DocumentId>) -> Result<i32> {
        Ok(self
            .repository
            .children(parent_id)?
            .iter()
            .filter(|d| Some(d.id()) != moving)
            .map(|d| d.node.sort_order + 1)
            .max()
            .unwrap_or(0))
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }
}
