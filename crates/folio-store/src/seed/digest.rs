//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds so fixture runs can be compared

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::SeedV0;

#[derive(Serialize)]
struct CanonicalSeed<'a> {
    schema_version: u32,
    languages: Vec<(String, &'a str, bool, bool)>,
    content_types: Vec<&'a crate::seed::format_v0::SeedContentType>,
    documents: &'a [crate::seed::format_v0::SeedDocument],
}

/// Compute a stable digest for a seed
///
/// Languages are canonicalised and sorted, content types sorted by alias.
/// Document order is significant (it is the sort order) and kept.
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let mut languages: Vec<_> = seed
        .languages
        .iter()
        .map(|l| (l.iso_code.to_lowercase(), l.name.as_str(), l.is_default, l.is_mandatory))
        .collect();
    languages.sort();
    let mut content_types: Vec<_> = seed.content_types.iter().collect();
    content_types.sort_by(|a, b| a.alias.cmp(&b.alias));

    let canonical = CanonicalSeed {
        schema_version: seed.schema_version,
        languages,
        content_types,
        documents: &seed.documents,
    };
    let json = serde_json::to_string(&canonical)
        .map_err(|e| seed_validation(&format!("Failed to canonicalise seed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
