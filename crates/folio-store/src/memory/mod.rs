//! In-memory collaborators
//!
//! Scopes are whole-state snapshots: `begin_scope` clones the state,
//! `rollback_scope` restores the clone. Only one scope may be open at a time.

mod registry;
mod repository;
mod schedule;

pub use registry::ContentTypeRegistry;
pub use repository::MemoryContentRepository;
pub use schedule::ScheduleBook;
