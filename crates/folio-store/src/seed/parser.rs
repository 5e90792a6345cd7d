//! Seed parser with validation
//!
//! Parses YAML and validates the schema version, content-type references,
//! property aliases and the naming of each document.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::errors::{io_error, seed_validation, Result};
use crate::seed::format_v0::{SeedContentType, SeedDocument, SeedV0};

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<SeedV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("seed_read", e))?;
    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed)?;

    Ok(seed)
}

fn validate_seed(seed: &SeedV0) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut types: HashMap<&str, &SeedContentType> = HashMap::new();
    for content_type in &seed.content_types {
        if types.insert(content_type.alias.as_str(), content_type).is_some() {
            return Err(seed_validation(&format!(
                "Duplicate content type alias: {}",
                content_type.alias
            )));
        }
        let mut aliases = HashSet::new();
        for property in &content_type.properties {
            if !aliases.insert(property.alias.as_str()) {
                return Err(seed_validation(&format!(
                    "Duplicate property alias {} on content type {}",
                    property.alias, content_type.alias
                )));
            }
        }
    }

    let cultures: HashSet<String> = seed
        .languages
        .iter()
        .map(|l| l.iso_code.to_lowercase())
        .collect();

    let mut stack: Vec<&SeedDocument> = seed.documents.iter().collect();
    while let Some(doc) = stack.pop() {
        validate_document(doc, &types, &cultures)?;
        stack.extend(doc.children.iter());
    }

    Ok(())
}

fn validate_document(
    doc: &SeedDocument,
    types: &HashMap<&str, &SeedContentType>,
    cultures: &HashSet<String>,
) -> Result<()> {
    let content_type = types.get(doc.content_type.as_str()).ok_or_else(|| {
        seed_validation(&format!(
            "Document references unknown content type: {}",
            doc.content_type
        ))
    })?;
    let label = doc.label().unwrap_or("<unnamed>");

    if content_type.variation.varies_by_culture() {
        if doc.names.is_empty() {
            return Err(seed_validation(&format!(
                "Variant document of type {} has no culture names",
                doc.content_type
            )));
        }
        if !cultures.is_empty() {
            if let Some(unknown) = doc
                .names
                .keys()
                .find(|c| !cultures.contains(&c.to_lowercase()))
            {
                return Err(seed_validation(&format!(
                    "Document {} is named in unknown culture {}",
                    label, unknown
                )));
            }
        }
    } else {
        if doc.name.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(seed_validation(&format!(
                "Invariant document of type {} has no name",
                doc.content_type
            )));
        }
        if !doc.names.is_empty() {
            return Err(seed_validation(&format!(
                "Invariant document {} cannot have culture names",
                label
            )));
        }
    }

    for value in &doc.values {
        if !content_type.properties.iter().any(|p| p.alias == value.alias) {
            return Err(seed_validation(&format!(
                "Document {} sets unknown property {}",
                label, value.alias
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_content_type_rejected() {
        let yaml = r#"
schema_version: 0
documents:
  - type: missing
    name: Home
"#;
        let err = parse_seed_str(yaml).expect_err("Should reject unknown type");
        assert!(err.message().contains("unknown content type"));
    }

    #[test]
    fn test_invariant_document_needs_name() {
        let yaml = r#"
schema_version: 0
content_types:
  - alias: article
documents:
  - type: article
"#;
        let err = parse_seed_str(yaml).expect_err("Should reject unnamed document");
        assert!(err.message().contains("has no name"));
    }
}
