use folio_core_types::DocumentId;

use super::{AuditEntry, CacheMessage, CachePayload, ChangeEvent, ChangeKind};
use crate::cascade::TransitionCode;
use crate::collaborators::{AuditSink, CacheRefresher};

/// Everything one operation wants to announce
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    pub events: Vec<ChangeEvent>,
    pub message: CacheMessage,
    pub audit: Vec<AuditEntry>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self, id: DocumentId, code: TransitionCode) {
        self.events.push(ChangeEvent::Refresh { id, code });
    }

    pub fn remove(&mut self, id: DocumentId) {
        self.events.push(ChangeEvent::Remove { id });
    }

    pub fn payload(&mut self, id: DocumentId, kind: ChangeKind) {
        self.message.push(CachePayload::new(id, kind));
    }

    pub fn audit(&mut self, entry: AuditEntry) {
        self.audit.push(entry);
    }

    /// Append another operation's batch after this one
    ///
    /// Payloads are appended as they are; duplicates across operations are
    /// kept so each operation's contribution stays visible in order.
    pub fn extend(&mut self, other: MutationBatch) {
        self.events.extend(other.events);
        self.message.payloads.extend(other.message.payloads);
        self.audit.extend(other.audit);
    }

    /// Send the cache message (if any) and the audit entries
    ///
    /// Call only after the operation's scope committed.
    pub fn dispatch(&self, cache: &mut dyn CacheRefresher, audit: &mut dyn AuditSink) {
        if !self.message.is_empty() {
            tracing::debug!(payloads = self.message.len(), "Dispatching cache message");
            cache.refresh(self.message.clone());
        }
        for entry in &self.audit {
            audit.write(entry.clone());
        }
    }
}
