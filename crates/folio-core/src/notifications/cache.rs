use std::fmt;

use folio_core_types::DocumentId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    RefreshNode,
    RefreshBranch,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CachePayload {
    pub id: DocumentId,
    pub kind: ChangeKind,
}

impl CachePayload {
    pub fn new(id: DocumentId, kind: ChangeKind) -> Self {
        Self { id, kind }
    }
}

impl fmt::Display for CachePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.id)
    }
}

/// What a cache refresher receives after a committed operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheMessage {
    pub payloads: Vec<CachePayload>,
}

impl CacheMessage {
    /// Append a payload; exact duplicates are collapsed
    pub fn push(&mut self, payload: CachePayload) {
        if !self.payloads.contains(&payload) {
            self.payloads.push(payload);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }
}

impl fmt::Display for CacheMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.payloads.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
