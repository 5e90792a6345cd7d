use folio_core_types::{DocumentId, RECYCLE_BIN_ID, ROOT_ID};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placement of a document in the tree
///
/// `path` is the ancestor chain from the root (`-1`) down to and including
/// the node itself. Trashed subtrees live under the recycle bin (`-1,-20,...`).
/// The recycle bin sits at level 0, so its children are level 1 like root
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: DocumentId,
    pub key: Uuid,
    pub parent_id: DocumentId,
    pub path: Vec<DocumentId>,
    pub level: u32,
    pub sort_order: i32,
    pub trashed: bool,
}

impl ContentNode {
    /// A node that has not been saved yet
    pub fn new(parent_id: DocumentId) -> Self {
        Self {
            id: 0,
            key: Uuid::new_v4(),
            parent_id,
            path: Vec::new(),
            level: 0,
            sort_order: 0,
            trashed: false,
        }
    }

    pub fn has_identity(&self) -> bool {
        self.id != 0
    }

    /// Ancestor ids, nearest first, excluding the root and the recycle bin
    pub fn ancestor_ids(&self) -> Vec<DocumentId> {
        self.path
            .iter()
            .rev()
            .skip(1)
            .copied()
            .filter(|id| *id != ROOT_ID && *id != RECYCLE_BIN_ID)
            .collect()
    }

    pub fn is_in_recycle_bin(&self) -> bool {
        self.path.contains(&RECYCLE_BIN_ID)
    }

    /// Whether `other` sits at or below this node
    pub fn is_ancestor_or_self_of(&self, other: &ContentNode) -> bool {
        other.path.contains(&self.id)
    }

    /// Place the node under a parent whose path and level are given
    ///
    /// For the root and the recycle bin pass their implicit paths and level 0.
    pub fn place_under(&mut self, parent_id: DocumentId, parent_path: &[DocumentId], parent_level: u32) {
        self.parent_id = parent_id;
        self.path = parent_path.to_vec();
        self.path.push(self.id);
        self.level = parent_level + 1;
    }

    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Implicit path of the root or the recycle bin
pub fn system_path(id: DocumentId) -> Vec<DocumentId> {
    if id == RECYCLE_BIN_ID {
        vec![ROOT_ID, RECYCLE_BIN_ID]
    } else {
        vec![ROOT_ID]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: DocumentId, path: Vec<DocumentId>) -> ContentNode {
        ContentNode {
            id,
            key: Uuid::new_v4(),
            parent_id: path[path.len() - 2],
            level: (path.len() - 1) as u32,
            path,
            sort_order: 0,
            trashed: false,
        }
    }

    #[test]
    fn test_ancestor_ids_nearest_first() {
        let n = node(21, vec![-1, 1, 2, 21]);
        assert_eq!(n.ancestor_ids(), vec![2, 1]);
    }

    #[test]
    fn test_recycle_bin_excluded_from_ancestors() {
        let n = node(5, vec![-1, -20, 3, 5]);
        assert!(n.is_in_recycle_bin());
        assert_eq!(n.ancestor_ids(), vec![3]);
    }

    #[test]
    fn test_place_under_recomputes_path_and_level() {
        let mut n = node(7, vec![-1, 7]);
        n.place_under(RECYCLE_BIN_ID, &system_path(RECYCLE_BIN_ID), 0);
        assert_eq!(n.path, vec![-1, -20, 7]);
        assert_eq!(n.level, 1);
        assert_eq!(n.path_string(), "-1,-20,7");
    }

    #[test]
    fn test_is_ancestor_or_self_of() {
        let parent = node(1, vec![-1, 1]);
        let child = node(2, vec![-1, 1, 2]);
        assert!(parent.is_ancestor_or_self_of(&child));
        assert!(parent.is_ancestor_or_self_of(&parent));
        assert!(!child.is_ancestor_or_self_of(&parent));
    }
}
