use std::fmt;

use folio_core_types::DocumentId;
use serde::Serialize;

use crate::cascade::TransitionCode;

/// One per affected node, in the order the operation touched them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    Refresh {
        id: DocumentId,
        code: TransitionCode,
    },
    Remove {
        id: DocumentId,
    },
}

impl ChangeEvent {
    pub fn id(&self) -> DocumentId {
        match self {
            ChangeEvent::Refresh { id, .. } | ChangeEvent::Remove { id } => *id,
        }
    }
}

/// `12.u+p` or `12.removed`
impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Refresh { id, code } => write!(f, "{}.{}", id, code),
            ChangeEvent::Remove { id } => write!(f, "{}.removed", id),
        }
    }
}
