//! Seed importer
//!
//! Imports a parsed seed through `ContentService`: languages first, then
//! content types, then the document tree in pre-order. Documents flagged
//! `publish` go through save-and-publish for every named culture, so a
//! fixture ends up in the state the real publish rules produce.

use std::path::Path;

use folio_core::model::{ContentType, CultureSelection, PropertyType};
use folio_core::types::{DocumentId, ROOT_ID};
use folio_core::{log_op_end, log_op_error, log_op_start};
use folio_store::seed::{compute_seed_digest, parse_seed_file, SeedDocument, SeedV0};
use folio_store::Result;

use crate::ContentService;

/// Summary of an import
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub digest: String,
    pub content_types: usize,
    pub documents: usize,
    pub published: usize,
    /// `(label, id)` of every imported document, pre-order
    pub ids: Vec<(String, DocumentId)>,
}

impl ImportReport {
    /// Id of the first document imported under `label`
    pub fn id_of(&self, label: &str) -> Option<DocumentId> {
        self.ids
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, id)| *id)
    }
}

/// Parse and import a seed file
pub fn import_seed_file(service: &mut ContentService, path: &Path) -> Result<ImportReport> {
    let seed = parse_seed_file(path)?;
    import_seed(service, &seed)
}

pub fn import_seed(service: &mut ContentService, seed: &SeedV0) -> Result<ImportReport> {
    log_op_start!("seed_import");
    let start = std::time::Instant::now();

    let report = import_impl(service, seed).map_err(|e| {
        log_op_error!(
            "seed_import",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "seed_import",
        duration_ms = start.elapsed().as_millis() as u64,
        node_count = report.documents as u64
    );
    Ok(report)
}

fn import_impl(service: &mut ContentService, seed: &SeedV0) -> Result<ImportReport> {
    let mut report = ImportReport {
        digest: compute_seed_digest(seed)?,
        ..ImportReport::default()
    };

    if !seed.languages.is_empty() {
        service.set_languages(seed.languages.clone())?;
    }

    for seed_type in &seed.content_types {
        let mut content_type = ContentType::new(seed_type.alias.clone(), seed_type.variation);
        for property in &seed_type.properties {
            let mut property_type = PropertyType::new(property.alias.clone(), property.variation);
            if property.mandatory {
                property_type = property_type.mandatory();
            }
            content_type = content_type.with_property(property_type);
        }
        service.save_content_type(content_type)?;
        report.content_types += 1;
    }

    let mut stack: Vec<(&SeedDocument, DocumentId)> =
        seed.documents.iter().rev().map(|d| (d, ROOT_ID)).collect();
    while let Some((node, parent_id)) = stack.pop() {
        let id = import_document(service, node, parent_id, &mut report)?;
        stack.extend(node.children.iter().rev().map(|child| (child, id)));
    }

    Ok(report)
}

fn import_document(
    service: &mut ContentService,
    node: &SeedDocument,
    parent_id: DocumentId,
    report: &mut ImportReport,
) -> Result<DocumentId> {
    let name = node.name.as_deref().unwrap_or_default();
    let mut doc = service.create(name, parent_id, &node.content_type)?;
    for (culture, culture_name) in &node.names {
        doc.set_culture_name(culture_name, culture)?;
    }
    for value in &node.values {
        doc.set_value(
            &value.alias,
            value.value.clone(),
            value.culture.as_deref(),
            value.segment.as_deref(),
        )?;
    }

    if node.publish {
        let outcome = service.save_and_publish(&mut doc, CultureSelection::All)?;
        if outcome.value.is_success() {
            report.published += 1;
        } else {
            tracing::warn!(
                document_id = doc.id(),
                result = %outcome.value.result,
                "Seed document {} was saved but not published",
                node.label().unwrap_or_default()
            );
        }
    } else {
        service.save(&mut doc)?;
    }

    report.documents += 1;
    report
        .ids
        .push((node.label().unwrap_or_default().to_string(), doc.id()));
    Ok(doc.id())
}
