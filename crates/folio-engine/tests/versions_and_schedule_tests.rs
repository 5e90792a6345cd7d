#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, Utc};
use common::{payload, Harness};
use folio_core::model::{ContentSchedule, CultureSelection, Document, ScheduleAction};
use folio_core::notifications::ChangeKind;
use folio_core::publishing::PublishResultType;
use folio_core::types::{VersionId, ROOT_ID};
use folio_core::FolioError;
use serde_json::json;

/// An article published three times with an edit before each republish
fn republished(h: &mut Harness) -> Document {
    let mut doc = h.published_article("History", ROOT_ID);
    for body in ["Second", "Third"] {
        doc.set_value("body", json!(body), None, None).expect("Should set");
        h.service
            .save_and_publish(&mut doc, CultureSelection::All)
            .expect("Should publish");
    }
    h.reset_recorders();
    doc
}

// ===== Versions =====

#[test]
fn test_each_publish_with_changes_freezes_a_version() {
    let mut h = Harness::new();
    let doc = republished(&mut h);

    let versions = h.service.get_versions(doc.id()).expect("Should list versions");

    assert_eq!(versions.len(), 4);
    assert_eq!(versions[0].id, doc.current_version_id);
    assert_eq!(Some(versions[1].id), doc.published_version_id);
}

#[test]
fn test_delete_version_removes_one_historical_version() {
    // GIVEN: three frozen versions
    let mut h = Harness::new();
    let doc = republished(&mut h);
    let oldest = doc.history[0].id;

    // WHEN: the oldest is deleted
    let outcome = h
        .service
        .delete_version(doc.id(), oldest, false)
        .expect("Should delete version");

    // THEN: only that one is gone
    assert_eq!(outcome.value, 1);
    let stored = h.reload(doc.id());
    assert_eq!(stored.version_count(), 3);
    assert!(stored.history.iter().all(|v| v.id != oldest));
    assert_eq!(h.audit_lines(), vec!["Delete (by version)".to_string()]);
}

#[test]
fn test_delete_prior_versions_spares_current_and_published() {
    let mut h = Harness::new();
    let doc = republished(&mut h);

    let outcome = h
        .service
        .delete_version(doc.id(), doc.current_version_id, true)
        .expect("Should delete versions");

    assert_eq!(outcome.value, 2);
    let stored = h.reload(doc.id());
    assert_eq!(stored.version_count(), 2);
    assert_eq!(Some(stored.history[0].id), stored.published_version_id);
    assert_eq!(
        stored.get_value("body", None, None, true),
        Some(&json!("Third"))
    );
}

#[test]
fn test_published_version_cannot_be_deleted() {
    let mut h = Harness::new();
    let doc = republished(&mut h);
    let published = doc.published_version_id.expect("Should have a published version");

    let outcome = h
        .service
        .delete_version(doc.id(), published, false)
        .expect("Should not error");

    assert_eq!(outcome.value, 0);
    assert_eq!(h.reload(doc.id()).version_count(), 4);
}

#[test]
fn test_delete_unknown_version_fails() {
    let mut h = Harness::new();
    let doc = republished(&mut h);

    let result = h.service.delete_version(doc.id(), VersionId::new(), false);

    assert!(matches!(result, Err(FolioError::VersionNotFound { .. })));
}

#[test]
fn test_delete_versions_before_date() {
    let mut h = Harness::new();
    let doc = republished(&mut h);

    let outcome = h
        .service
        .delete_versions(doc.id(), Utc::now() + Duration::days(1))
        .expect("Should delete versions");

    assert_eq!(outcome.value, 2);
    assert_eq!(h.reload(doc.id()).version_count(), 2);
    assert_eq!(h.audit_lines(), vec!["Delete (by version date)".to_string()]);
}

// ===== Rollback =====

#[test]
fn test_rollback_invariant_document_restores_draft_values() {
    // GIVEN: an article published three times
    let mut h = Harness::new();
    let doc = republished(&mut h);
    let first = doc.history[0].id;

    // WHEN: it is rolled back to the first version
    let outcome = h
        .service
        .rollback(doc.id(), first, "*")
        .expect("Should roll back");

    // THEN: the draft is restored, the live version is untouched
    let stored = h.reload(doc.id());
    assert_eq!(
        stored.get_value("body", None, None, false),
        Some(&json!("History body"))
    );
    assert_eq!(
        stored.get_value("body", None, None, true),
        Some(&json!("Third"))
    );
    assert!(stored.edited);
    assert!(stored.published);
    assert_eq!(stored.version_count(), 4);
    assert_eq!(outcome.message.payloads, vec![payload(doc.id(), ChangeKind::RefreshNode)]);
    assert_eq!(
        h.audit_lines(),
        vec!["Saved".to_string(), format!("Rolled back: {}", first)]
    );
}

#[test]
fn test_rollback_one_culture_leaves_other_cultures() {
    // GIVEN: a page published as Bonjour, republished as Salut, then English renamed
    let mut h = Harness::new();
    let mut doc = h.page(&[("en-US", "Hello"), ("fr-FR", "Bonjour")], ROOT_ID);
    h.service
        .save_and_publish(&mut doc, CultureSelection::All)
        .expect("Should publish");
    doc.set_culture_name("Salut", "fr-FR").expect("Should rename");
    doc.set_value("title", json!("Salut title"), Some("fr-FR"), None)
        .expect("Should set title");
    h.service
        .save_and_publish(&mut doc, CultureSelection::All)
        .expect("Should republish");
    doc.set_culture_name("Hi", "en-US").expect("Should rename");
    h.service.save(&mut doc).expect("Should save");
    let first = doc.history[0].id;
    h.reset_recorders();

    // WHEN: French is rolled back to the first version
    h.service
        .rollback(doc.id(), first, "fr-FR")
        .expect("Should roll back French");

    // THEN: only French drafts change; French is edited against its live version
    let stored = h.reload(doc.id());
    assert_eq!(stored.culture_name("fr-FR"), Some("Bonjour"));
    assert_eq!(
        stored.get_value("title", Some("fr-FR"), None, false),
        Some(&json!("Bonjour title"))
    );
    assert_eq!(
        stored.get_value("title", Some("fr-FR"), None, true),
        Some(&json!("Salut title"))
    );
    assert_eq!(stored.culture_name("en-US"), Some("Hi"));
    assert!(stored.is_culture_edited("fr-FR"));
    assert!(stored.is_culture_published("fr-FR"));
    assert_eq!(
        h.audit_lines(),
        vec![
            "Saved languages: French (France)".to_string(),
            format!("Rolled back: {}", first),
        ]
    );
}

#[test]
fn test_rollback_rejects_unknown_version_and_trashed_document() {
    let mut h = Harness::new();
    let doc = republished(&mut h);

    let unknown = h.service.rollback(doc.id(), VersionId::new(), "*");
    assert!(matches!(unknown, Err(FolioError::VersionNotFound { .. })));

    let invariant_culture = h.service.rollback(doc.id(), doc.history[0].id, "fr-FR");
    assert!(matches!(
        invariant_culture,
        Err(FolioError::CultureNotSupported { .. })
    ));

    h.service
        .move_to_recycle_bin(doc.id())
        .expect("Should trash");
    let trashed = h.service.rollback(doc.id(), doc.history[0].id, "*");
    assert!(matches!(trashed, Err(FolioError::IllegalState { .. })));
    assert_eq!(
        h.reload(doc.id()).get_value("body", None, None, false),
        Some(&json!("Third"))
    );
}

// ===== Scheduled publishing =====

#[test]
fn test_scheduled_release_publishes_invariant_document() {
    // GIVEN: an article released in one hour
    let mut h = Harness::new();
    let doc = h.article("Scheduled", ROOT_ID);
    let now = Utc::now();
    let mut schedule = ContentSchedule::new();
    schedule.add(None, ScheduleAction::Release, now + Duration::hours(1));
    h.service.set_schedule(doc.id(), schedule).expect("Should schedule");

    // WHEN: the scheduler runs before and after the release date
    let early = h.service.perform_scheduled_publish(now);
    let due = h.service.perform_scheduled_publish(now + Duration::hours(2));

    // THEN: it is published once the date is reached
    assert!(early.is_empty());
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].result, PublishResultType::SuccessPublish);
    assert!(h.reload(doc.id()).published);
    assert!(h.service.schedule(doc.id()).is_empty());
}

#[test]
fn test_scheduled_release_publishes_cultures() {
    let mut h = Harness::new();
    let doc = h.page(&[("en-US", "Hello"), ("fr-FR", "Bonjour")], ROOT_ID);
    let now = Utc::now();
    let mut schedule = ContentSchedule::new();
    schedule.add(Some("en-US"), ScheduleAction::Release, now + Duration::hours(1));
    schedule.add(Some("fr-FR"), ScheduleAction::Release, now + Duration::hours(1));
    h.service.set_schedule(doc.id(), schedule).expect("Should schedule");

    let results = h.service.perform_scheduled_publish(now + Duration::hours(2));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result, PublishResultType::SuccessPublishCulture);
    let stored = h.reload(doc.id());
    assert!(stored.is_culture_published("en-US"));
    assert!(stored.is_culture_published("fr-FR"));
}

#[test]
fn test_scheduled_expiry_unpublishes_document() {
    let mut h = Harness::new();
    let doc = h.published_article("Expiring", ROOT_ID);
    let now = Utc::now();
    let mut schedule = ContentSchedule::new();
    schedule.add(None, ScheduleAction::Expire, now + Duration::hours(1));
    h.service.set_schedule(doc.id(), schedule).expect("Should schedule");

    let results = h.service.perform_scheduled_publish(now + Duration::hours(2));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result, PublishResultType::SuccessUnpublish);
    assert!(!h.reload(doc.id()).published);
}

#[test]
fn test_scheduled_release_of_trashed_document_fails() {
    let mut h = Harness::new();
    let doc = h.article("Trashed", ROOT_ID);
    h.service.move_to_recycle_bin(doc.id()).expect("Should trash");
    let now = Utc::now();
    let mut schedule = ContentSchedule::new();
    schedule.add(None, ScheduleAction::Release, now + Duration::hours(1));
    h.service.set_schedule(doc.id(), schedule).expect("Should schedule");

    let results = h.service.perform_scheduled_publish(now + Duration::hours(2));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result, PublishResultType::FailedPublishIsTrashed);
    assert!(!h.reload(doc.id()).published);
    assert!(h.service.schedule(doc.id()).is_empty());
}
