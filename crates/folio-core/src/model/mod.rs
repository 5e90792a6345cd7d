//! Domain model: tree placement, documents, cultures, property values,
//! content types and versions.

pub mod content_type;
pub mod culture;
pub mod document;
pub mod language;
pub mod node;
pub mod property;
pub mod schedule;
pub mod variation;
pub mod version;

pub use content_type::{ContentType, PropertyType};
pub use culture::{CultureInfos, CultureSelection, CultureVariation};
pub use document::{Document, PendingChanges, PublishedState};
pub use language::Language;
pub use node::ContentNode;
pub use property::{Property, PropertyValue, SlotKey, ValueScope};
pub use schedule::{ContentSchedule, ScheduleAction, ScheduleEntry};
pub use variation::ContentVariation;
pub use version::{Version, VersionSnapshot};
