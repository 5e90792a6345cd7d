//! Publish checks and strategies
//!
//! Callers set pending marks on a `Document` (`publish_culture`,
//! `unpublish_culture`, `mark_unpublishing`), then ask `can_publish` whether
//! the marks may be applied and run `strategy_publish` or `strategy_unpublish`
//! to apply them. The check order is fixed:
//!
//! 1. names and mandatory values (`FailedPublishContentInvalid`)
//! 2. nothing marked, mandatory culture missing, unpublish-only
//! 3. per impacted culture: expired, awaiting release, trashed
//! 4. the path, when the caller asked for it
//! 5. mixed publish/unpublish

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::model::language::default_culture;
use crate::model::{
    ContentSchedule, ContentType, Document, Language, ScheduleAction, ValueScope,
};

use super::result::{PublishResult, PublishResultType};

/// Inputs of a publish check besides the document itself
#[derive(Debug, Clone, Copy)]
pub struct PublishCheck<'a> {
    pub languages: &'a [Language],
    pub schedule: &'a ContentSchedule,
    pub now: DateTime<Utc>,
    /// `Some(false)` fails the check with `FailedPublishPathNotPublished`;
    /// `None` skips the path check
    pub path_publishable: Option<bool>,
}

/// Decide whether the pending marks on `doc` can be committed
pub fn can_publish(doc: &Document, content_type: &ContentType, check: &PublishCheck<'_>) -> PublishResult {
    let result = evaluate(doc, content_type, check);
    if !result.is_success() {
        tracing::info!(
            document_id = doc.id(),
            result = %result.result,
            "Document {} (id={}) cannot be published: {}",
            doc.name.as_deref().unwrap_or_default(),
            doc.id(),
            result.result.reason()
        );
    }
    result
}

fn evaluate(doc: &Document, content_type: &ContentType, check: &PublishCheck<'_>) -> PublishResult {
    let id = doc.id();
    let outcome = |result| PublishResult::new(result, id);
    let variant = doc.varies_by_culture();
    let publishing = &doc.pending().publishing;
    let unpublishing = &doc.pending().unpublishing;
    let default = default_culture(check.languages);

    if variant && publishing.iter().any(|c| !doc.cultures.is_available(c)) {
        return outcome(PublishResultType::FailedPublishContentInvalid);
    }

    let invalid = invalid_properties(doc, content_type, publishing, default);
    if !invalid.is_empty() {
        return PublishResult {
            result: PublishResultType::FailedPublishContentInvalid,
            document_id: id,
            invalid_properties: invalid,
        };
    }

    if variant {
        if publishing.is_empty() && unpublishing.is_empty() {
            return outcome(PublishResultType::FailedPublishNothingToPublish);
        }
        let after = doc.published_cultures_after_commit();
        let mandatory_missing = check
            .languages
            .iter()
            .any(|l| l.is_mandatory && !after.contains(&l.iso_code));
        if mandatory_missing {
            return outcome(PublishResultType::FailedPublishMandatoryCultureMissing);
        }
        if publishing.is_empty() {
            return outcome(PublishResultType::SuccessUnpublishCulture);
        }
    }

    let impacts: Vec<Option<&str>> = if variant {
        publishing.iter().map(|c| Some(c.as_str())).collect()
    } else {
        vec![None]
    };
    for culture in impacts {
        if check.schedule.has_expired(culture, check.now) {
            return outcome(if culture.is_some() {
                PublishResultType::FailedPublishCultureHasExpired
            } else {
                PublishResultType::FailedPublishHasExpired
            });
        }
        if check.schedule.is_awaiting_release(culture, check.now) {
            return outcome(if culture.is_some() {
                PublishResultType::FailedPublishCultureAwaitingRelease
            } else {
                PublishResultType::FailedPublishAwaitingRelease
            });
        }
        if doc.trashed() {
            return outcome(PublishResultType::FailedPublishIsTrashed);
        }
    }

    if check.path_publishable == Some(false) {
        return outcome(PublishResultType::FailedPublishPathNotPublished);
    }

    if variant && !unpublishing.is_empty() {
        return outcome(PublishResultType::SuccessMixedCulture);
    }

    outcome(if variant {
        PublishResultType::SuccessPublishCulture
    } else {
        PublishResultType::SuccessPublish
    })
}

/// Aliases of mandatory properties without a draft value in the impacted slots
///
/// Invariant values count when the document is invariant, when the default
/// culture is being published, or on a first publish.
fn invalid_properties(
    doc: &Document,
    content_type: &ContentType,
    publishing: &BTreeSet<String>,
    default: Option<&str>,
) -> Vec<String> {
    let impacts_invariant = !doc.varies_by_culture()
        || !doc.published
        || default.map(|d| publishing.contains(d)).unwrap_or(false);

    content_type
        .property_types
        .iter()
        .filter(|pt| pt.mandatory)
        .filter(|pt| {
            let Some(property) = doc.property(&pt.alias) else {
                return true;
            };
            if property.variation.varies_by_culture() {
                publishing.iter().any(|c| !property.has_draft_value(Some(c)))
            } else {
                impacts_invariant && !property.has_draft_value(None)
            }
        })
        .map(|pt| pt.alias.clone())
        .collect()
}

/// Apply the pending publish marks of a document that passed `can_publish`
///
/// Draft values of the impacted cultures become published, culture flags and
/// publish names are updated and a new version is frozen when something
/// actually changes. Returns the success code describing what was applied.
pub fn strategy_publish(doc: &mut Document, languages: &[Language], now: DateTime<Utc>) -> PublishResultType {
    let default = default_culture(languages);
    let publishing = doc.pending().publishing.clone();
    let unpublishing = doc.pending().unpublishing.clone();
    let first_publish = !doc.published;
    let freeze = first_publish || doc.edited || !unpublishing.is_empty();

    let result = if doc.varies_by_culture() {
        let invariant_too =
            first_publish || default.map(|d| publishing.contains(d)).unwrap_or(false);
        for property in doc.properties_mut() {
            for culture in &publishing {
                property.publish_values(&ValueScope::Culture(culture.clone()));
            }
            if invariant_too {
                property.publish_values(&ValueScope::Invariant);
            }
        }
        for culture in &publishing {
            doc.cultures.publish(culture, now);
        }
        if invariant_too || doc.publish_name.is_none() {
            doc.publish_name = doc.name.clone();
        }
        apply_culture_unpublish(doc);

        match (publishing.is_empty(), unpublishing.is_empty()) {
            (false, false) => PublishResultType::SuccessMixedCulture,
            (true, false) => PublishResultType::SuccessUnpublishCulture,
            _ => PublishResultType::SuccessPublishCulture,
        }
    } else {
        for property in doc.properties_mut() {
            property.publish_values(&ValueScope::All);
        }
        doc.publish_name = doc.name.clone();
        PublishResultType::SuccessPublish
    };

    if result != PublishResultType::SuccessUnpublishCulture || !doc.cultures.published().is_empty() {
        doc.published = true;
        doc.publish_date = Some(now);
    }
    if freeze {
        doc.freeze_current_version(now);
    }
    doc.clear_pending();
    doc.recompute_edited(default);
    result
}

/// Clear the published flag of every culture marked for unpublishing
pub fn apply_culture_unpublish(doc: &mut Document) {
    let unpublishing = doc.pending().unpublishing.clone();
    for culture in &unpublishing {
        doc.cultures.unpublish(culture);
    }
}

/// Take the whole document offline
///
/// Culture flags are left alone; they are masked by the document flag.
/// Published values and the published version are retained for a later
/// re-publish. Expirations already due are dropped from `schedule`.
pub fn strategy_unpublish(
    doc: &mut Document,
    schedule: &mut ContentSchedule,
    languages: &[Language],
    now: DateTime<Utc>,
) -> PublishResultType {
    doc.published = false;
    doc.clear_pending();
    let dropped = schedule.clear_pending(ScheduleAction::Expire, now);
    if dropped > 0 {
        tracing::debug!(document_id = doc.id(), dropped, "Cleared due expirations");
    }
    doc.recompute_edited(default_culture(languages));
    PublishResultType::SuccessUnpublish
}
