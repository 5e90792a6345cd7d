//! Per-node decision of a publish-branch walk

use std::collections::BTreeSet;

use crate::errors::Result;
use crate::model::{CultureSelection, Document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecision {
    /// Skip the node and everything below it
    Exclude,
    /// Nothing edited in the requested cultures; children are still visited
    AlreadyPublished,
    /// Mark these cultures for publishing (empty for invariant documents)
    Publish(BTreeSet<String>),
}

/// Decide what a publish-branch walk does with `doc`
///
/// Published cultures are republished when edited. Unpublished cultures are
/// only published on the branch root or when `force` is set.
pub fn decide(
    doc: &Document,
    is_root: bool,
    force: bool,
    selection: &CultureSelection,
) -> Result<BranchDecision> {
    if !doc.varies_by_culture() {
        return Ok(match candidate(doc.published, doc.edited, is_root, force) {
            None => BranchDecision::Exclude,
            Some(false) => BranchDecision::AlreadyPublished,
            Some(true) => BranchDecision::Publish(BTreeSet::new()),
        });
    }

    let requested = match selection.canonical()? {
        Some(codes) => codes,
        None => doc.cultures.available(),
    };

    let mut considered = false;
    let mut cultures = BTreeSet::new();
    for culture in requested {
        if !doc.cultures.is_available(&culture) {
            continue;
        }
        let published = doc.published && doc.cultures.is_published(&culture);
        match candidate(published, doc.cultures.is_edited(&culture), is_root, force) {
            None => {}
            Some(edited) => {
                considered = true;
                if edited {
                    cultures.insert(culture);
                }
            }
        }
    }

    Ok(if !considered {
        BranchDecision::Exclude
    } else if cultures.is_empty() {
        BranchDecision::AlreadyPublished
    } else {
        BranchDecision::Publish(cultures)
    })
}

/// `None`: leave alone; `Some(false)`: already published; `Some(true)`: publish
fn candidate(published: bool, edited: bool, is_root: bool, force: bool) -> Option<bool> {
    if published {
        Some(edited)
    } else if force || is_root {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, ContentVariation};
    use chrono::Utc;

    fn invariant(published: bool, edited: bool) -> Document {
        let ct = ContentType::new("page", ContentVariation::Nothing);
        let mut doc = Document::new(&ct, -1, "Page");
        doc.published = published;
        doc.edited = edited;
        doc
    }

    #[test]
    fn test_unpublished_child_excluded_unless_forced() {
        let doc = invariant(false, true);
        let all = CultureSelection::All;
        assert_eq!(decide(&doc, false, false, &all).expect("Should decide"), BranchDecision::Exclude);
        assert_eq!(
            decide(&doc, false, true, &all).expect("Should decide"),
            BranchDecision::Publish(BTreeSet::new())
        );
        assert_eq!(
            decide(&doc, true, false, &all).expect("Should decide"),
            BranchDecision::Publish(BTreeSet::new())
        );
    }

    #[test]
    fn test_published_without_edits_is_already_published() {
        let doc = invariant(true, false);
        assert_eq!(
            decide(&doc, false, true, &CultureSelection::All).expect("Should decide"),
            BranchDecision::AlreadyPublished
        );
    }

    #[test]
    fn test_variant_republishes_only_edited_published_cultures() {
        let ct = ContentType::new("page", ContentVariation::Culture);
        let mut doc = Document::new(&ct, -1, "");
        doc.set_culture_name("Hello", "en-US").expect("Should set");
        doc.set_culture_name("Bonjour", "fr-FR").expect("Should set");
        doc.set_culture_name("Hallo", "de-DE").expect("Should set");
        let now = Utc::now();
        doc.cultures.publish("en-us", now);
        doc.cultures.publish("fr-fr", now);
        doc.published = true;
        doc.cultures.get_mut("fr-fr").expect("Should exist").edited = true;

        let decision = decide(&doc, false, false, &CultureSelection::All).expect("Should decide");

        assert_eq!(
            decision,
            BranchDecision::Publish(BTreeSet::from(["fr-fr".to_string()]))
        );
    }
}
