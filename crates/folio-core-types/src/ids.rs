//! Tree and version identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric document identifier. Zero means "not yet saved".
pub type DocumentId = i32;

/// Numeric content-type identifier. Zero means "not yet saved".
pub type ContentTypeId = i32;

/// Virtual parent of every top-level document.
pub const ROOT_ID: DocumentId = -1;

/// Virtual parent of every trashed top-level document.
pub const RECYCLE_BIN_ID: DocumentId = -20;

/// Identifier of one version snapshot of a document.
///
/// Built on UUIDv7 so that ids sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(Uuid);

impl VersionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for VersionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
