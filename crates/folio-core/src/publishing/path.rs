//! Path publishability
//!
//! A document is path-published when it and every ancestor are published and
//! not trashed. Anything under the recycle bin is never path-published.

use folio_core_types::{DocumentId, ROOT_ID};

use crate::errors::Result;
use crate::model::Document;

pub fn is_path_published<F>(doc: &Document, mut load: F) -> Result<bool>
where
    F: FnMut(DocumentId) -> Result<Document>,
{
    if !doc.published || doc.trashed() || doc.node.is_in_recycle_bin() {
        return Ok(false);
    }
    for ancestor_id in doc.node.ancestor_ids() {
        let ancestor = load(ancestor_id)?;
        if !ancestor.published || ancestor.trashed() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether `doc` could go live: top-level, or under a path-published parent
pub fn is_path_publishable<F>(doc: &Document, mut load: F) -> Result<bool>
where
    F: FnMut(DocumentId) -> Result<Document>,
{
    if doc.trashed() {
        return Ok(false);
    }
    if doc.parent_id() == ROOT_ID {
        return Ok(true);
    }
    let parent = load(doc.parent_id())?;
    is_path_published(&parent, load)
}
