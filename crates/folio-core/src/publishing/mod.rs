//! Publish state machine for a single document
//!
//! `can_publish` decides whether pending marks may be applied,
//! `strategy_publish` / `strategy_unpublish` apply them. Path checks read
//! ancestors through a lookup closure so the module stays free of storage.

pub mod machine;
pub mod path;
pub mod result;

pub use machine::{
    apply_culture_unpublish, can_publish, strategy_publish, strategy_unpublish, PublishCheck,
};
pub use path::{is_path_publishable, is_path_published};
pub use result::{PublishResult, PublishResultType};
