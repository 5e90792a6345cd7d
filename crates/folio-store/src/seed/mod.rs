//! Seed fixtures
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation
//! - Digest canonicalization
//!
//! Importing a seed drives the content service, so it lives in `folio-engine`.

pub mod digest;
pub mod format_v0;
pub mod parser;

pub use digest::compute_seed_digest;
pub use format_v0::{SeedContentType, SeedDocument, SeedProperty, SeedV0, SeedValue};
pub use parser::{parse_seed_file, parse_seed_str};
