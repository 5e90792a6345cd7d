//! Types shared by every Folio crate
//!
//! - **Identifiers**: well-known tree ids and the version id newtype
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: canonical structured-log field keys and event names

pub mod correlation;
pub mod ids;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
pub use ids::{ContentTypeId, DocumentId, VersionId, RECYCLE_BIN_ID, ROOT_ID};
