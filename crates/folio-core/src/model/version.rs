use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use folio_core_types::VersionId;
use serde_json::Value;

use super::SlotKey;

/// Draft names and values captured when a version was frozen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionSnapshot {
    pub name: Option<String>,
    pub culture_names: BTreeMap<String, String>,
    pub values: BTreeMap<String, BTreeMap<SlotKey, Value>>,
}

/// Immutable history entry of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    pub id: VersionId,
    pub date: DateTime<Utc>,
    /// Version that was live while this one was current
    pub published_version_id: Option<VersionId>,
    pub snapshot: VersionSnapshot,
}
