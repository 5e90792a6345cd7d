use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FolioError, Result};

/// Visible publish state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishState {
    Unpublished,
    Published,
    /// Published itself, hidden by an unpublished or trashed ancestor
    Masked,
}

impl PublishState {
    pub fn as_char(self) -> char {
        match self {
            PublishState::Unpublished => 'u',
            PublishState::Published => 'p',
            PublishState::Masked => 'm',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionSymbol {
    /// `+`
    BecamePublished,
    /// `-`
    BecameUnpublished,
    /// `=`
    Unchanged,
}

impl TransitionSymbol {
    pub fn as_char(self) -> char {
        match self {
            TransitionSymbol::BecamePublished => '+',
            TransitionSymbol::BecameUnpublished => '-',
            TransitionSymbol::Unchanged => '=',
        }
    }
}

/// `<before><symbol><after>`, e.g. `u+p`, `p-u`, `p=m`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionCode {
    pub before: PublishState,
    pub symbol: TransitionSymbol,
    pub after: PublishState,
}

fn state(published: bool) -> PublishState {
    if published {
        PublishState::Published
    } else {
        PublishState::Unpublished
    }
}

impl TransitionCode {
    /// The node went live; `parent_visible` is true under the root or a
    /// path-published parent
    pub fn published(was_published: bool, parent_visible: bool) -> Self {
        Self {
            before: state(was_published),
            symbol: TransitionSymbol::BecamePublished,
            after: if parent_visible {
                PublishState::Published
            } else {
                PublishState::Masked
            },
        }
    }

    pub fn unpublished(was_published: bool) -> Self {
        Self {
            before: state(was_published),
            symbol: TransitionSymbol::BecameUnpublished,
            after: PublishState::Unpublished,
        }
    }

    /// No publish-state change; a published node is masked unless its whole
    /// path is published
    pub fn unchanged(was_published: bool, published: bool, path_published: bool) -> Self {
        let after = match (published, path_published) {
            (true, true) => PublishState::Published,
            (true, false) => PublishState::Masked,
            (false, _) => PublishState::Unpublished,
        };
        Self {
            before: state(was_published),
            symbol: TransitionSymbol::Unchanged,
            after,
        }
    }
}

impl fmt::Display for TransitionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.before.as_char(),
            self.symbol.as_char(),
            self.after.as_char()
        )
    }
}

impl FromStr for TransitionCode {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FolioError::Serialization {
            message: format!("invalid transition code '{}'", s),
        };
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(invalid());
        }
        let publish_state = |c: char| match c {
            'u' => Some(PublishState::Unpublished),
            'p' => Some(PublishState::Published),
            'm' => Some(PublishState::Masked),
            _ => None,
        };
        let symbol = match chars[1] {
            '+' => TransitionSymbol::BecamePublished,
            '-' => TransitionSymbol::BecameUnpublished,
            '=' => TransitionSymbol::Unchanged,
            _ => return Err(invalid()),
        };
        Ok(Self {
            before: publish_state(chars[0]).ok_or_else(invalid)?,
            symbol,
            after: publish_state(chars[2]).ok_or_else(invalid)?,
        })
    }
}
