//! Recording sinks
//!
//! Cloning a recorder shares its buffer, so a caller can hand one clone to a
//! service and read what it received through the other.

use std::sync::{Arc, Mutex};

use folio_core::collaborators::{AuditSink, CacheRefresher};
use folio_core::notifications::{AuditEntry, CacheMessage};

#[derive(Debug, Clone, Default)]
pub struct RecordingCacheRefresher {
    messages: Arc<Mutex<Vec<CacheMessage>>>,
}

impl RecordingCacheRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<CacheMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<CacheMessage> {
        self.messages().pop()
    }

    pub fn clear(&self) {
        self.messages.lock().map(|mut m| m.clear()).ok();
    }
}

impl CacheRefresher for RecordingCacheRefresher {
    fn refresh(&mut self, message: CacheMessage) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(_) => tracing::warn!(payloads = message.len(), "Cache recorder poisoned, message dropped"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingAudit {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Messages of every entry, with parameters appended after `": "`
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|e| match e.parameters {
                Some(p) => format!("{}: {}", e.message, p),
                None => e.message,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().map(|mut e| e.clear()).ok();
    }
}

impl AuditSink for RecordingAudit {
    fn write(&mut self, entry: AuditEntry) {
        tracing::debug!(document_id = entry.document_id, message = %entry.message, "Audit");
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(_) => tracing::warn!(
                document_id = entry.document_id,
                "Audit recorder poisoned, entry dropped"
            ),
        }
    }
}
