//! Folio Store - in-memory collaborators and seed fixtures
//!
//! Provides:
//! - Scoped in-memory content repository with snapshot rollback
//! - Content-type registry and schedule book
//! - Recording cache refresher and audit log for inspection in tests and the CLI
//! - Seed format v0 schema, YAML parser and digest

pub mod errors;
pub mod memory;
pub mod recording;
pub mod seed;

pub use errors::Result;
pub use memory::{ContentTypeRegistry, MemoryContentRepository, ScheduleBook};
pub use recording::{RecordingAudit, RecordingCacheRefresher};
