//! Storage-free tree helpers for cascades

use std::collections::HashMap;

use folio_core_types::{DocumentId, RECYCLE_BIN_ID, ROOT_ID};

use crate::errors::{FolioError, Result};
use crate::model::Document;

/// Tracks which nodes of a pre-order walk are path-published
///
/// Seed it with the walk root's parent, then `record` every node in order.
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    visible: HashMap<DocumentId, bool>,
}

impl Visibility {
    /// `parent_visible` is whether the walk root's parent is path-published;
    /// ignored for the root and the recycle bin
    pub fn new(root_parent_id: DocumentId, parent_visible: bool) -> Self {
        let mut visible = HashMap::new();
        visible.insert(ROOT_ID, true);
        visible.insert(RECYCLE_BIN_ID, false);
        if root_parent_id != ROOT_ID && root_parent_id != RECYCLE_BIN_ID {
            visible.insert(root_parent_id, parent_visible);
        }
        Self { visible }
    }

    pub fn parent_visible(&self, doc: &Document) -> bool {
        self.visible.get(&doc.parent_id()).copied().unwrap_or(false)
    }

    /// Record `doc` and return whether it is path-published
    pub fn record(&mut self, doc: &Document) -> bool {
        let visible = doc.published && !doc.trashed() && self.parent_visible(doc);
        self.visible.insert(doc.id(), visible);
        visible
    }
}

/// Re-place a subtree under a new parent
///
/// `subtree` is in pre-order with the moved node first. Paths and levels are
/// recomputed for every node; `trashed` follows the new location.
pub fn relocate_subtree(
    subtree: &mut [Document],
    parent_id: DocumentId,
    parent_path: &[DocumentId],
    parent_level: u32,
) {
    let trashed = parent_path.contains(&RECYCLE_BIN_ID);
    let mut placed: HashMap<DocumentId, (Vec<DocumentId>, u32)> = HashMap::new();
    placed.insert(parent_id, (parent_path.to_vec(), parent_level));

    for (index, doc) in subtree.iter_mut().enumerate() {
        let parent = if index == 0 { parent_id } else { doc.parent_id() };
        let (path, level) = placed
            .get(&parent)
            .cloned()
            .unwrap_or_else(|| (parent_path.to_vec(), parent_level));
        doc.node.place_under(parent, &path, level);
        doc.node.trashed = trashed;
        placed.insert(doc.id(), (doc.node.path.clone(), doc.node.level));
    }
}

/// New sort orders for `requested`, keeping only siblings whose order changed
///
/// `current` holds `(id, sort_order)` for the siblings being sorted.
///
/// # Errors
///
/// `InvalidSort` when `requested` names an id twice or one outside `current`.
pub fn sort_plan(current: &[(DocumentId, i32)], requested: &[DocumentId]) -> Result<Vec<(DocumentId, i32)>> {
    let known: HashMap<DocumentId, i32> = current.iter().copied().collect();
    let mut seen = std::collections::HashSet::new();
    let mut changes = Vec::new();
    for (index, id) in requested.iter().enumerate() {
        if !seen.insert(*id) {
            return Err(FolioError::InvalidSort {
                reason: format!("document {} is listed twice", id),
            });
        }
        let Some(order) = known.get(id) else {
            return Err(FolioError::InvalidSort {
                reason: format!("document {} is not among the sorted siblings", id),
            });
        };
        let target = index as i32;
        if *order != target {
            changes.push((*id, target));
        }
    }
    Ok(changes)
}
