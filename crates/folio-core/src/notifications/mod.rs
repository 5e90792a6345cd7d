//! Change notifications
//!
//! Every operation collects its change events, cache payloads and audit
//! entries in a `MutationBatch`. The batch is dispatched once, after the
//! scope commits; a rolled back operation drops its batch unsent.

pub mod audit;
pub mod batch;
pub mod cache;
pub mod events;

pub use audit::{AuditEntry, AuditKind};
pub use batch::MutationBatch;
pub use cache::{CacheMessage, CachePayload, ChangeKind};
pub use events::ChangeEvent;
