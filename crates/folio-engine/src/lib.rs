//! Folio Engine - content service orchestration
//!
//! `ContentService` exposes the document operations (save, publish,
//! unpublish, branch publish, move, copy, delete, sort, scheduled publishing,
//! version housekeeping). Each operation runs inside one repository scope,
//! drives the core state machine and cascade helpers, and dispatches a single
//! cache message plus its audit entries once the scope commits.
//!
//! Seed fixtures are imported through the same service (see [`seed`]).

pub mod seed;
pub mod service;

pub use seed::{import_seed, import_seed_file, ImportReport};
pub use service::{Collaborators, ContentService, OperationOutcome};
