#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{payload, Harness};
use folio_core::notifications::ChangeKind;
use folio_core::types::ROOT_ID;
use folio_core::FolioError;
use serde_json::json;

#[test]
fn test_scope_dispatches_one_message_in_call_order() {
    // GIVEN: two saved articles
    let mut h = Harness::new();
    let mut a = h.article("A", ROOT_ID);
    let mut b = h.article("B", ROOT_ID);
    h.reset_recorders();

    // WHEN: A, B and A again are saved in one scope
    let audit = h.audit.clone();
    let cache = h.cache.clone();
    let outcome = h
        .service
        .scope(|svc| {
            svc.save(&mut a)?;
            svc.save(&mut b)?;
            svc.save(&mut a)?;
            Ok((audit.entries().len(), cache.messages().len()))
        })
        .expect("Should run the scope");

    // THEN: nothing was dispatched before the scope completed
    assert_eq!(outcome.value, (0, 0));

    // AND: one message carries every payload in call order
    let expected = vec![
        payload(a.id(), ChangeKind::RefreshNode),
        payload(b.id(), ChangeKind::RefreshNode),
        payload(a.id(), ChangeKind::RefreshNode),
    ];
    assert_eq!(outcome.message.payloads, expected);
    assert_eq!(h.cache.messages().len(), 1);
    assert_eq!(h.cache.messages()[0].payloads, expected);
    assert_eq!(outcome.events.len(), 3);
    assert_eq!(h.audit_lines(), vec!["Saved".to_string(); 3]);
}

#[test]
fn test_failed_operation_rolls_back_whole_scope() {
    // GIVEN: a saved article
    let mut h = Harness::new();
    let mut doc = h.article("Original", ROOT_ID);
    let id = doc.id();
    h.reset_recorders();

    // WHEN: a rename is saved, then a move fails and the error is ignored
    let outcome = h
        .service
        .scope(|svc| {
            doc.set_name("Renamed");
            svc.save(&mut doc)?;
            let moved = svc.move_to(id, id);
            Ok(moved.is_err())
        })
        .expect("Should end the scope");

    // THEN: the rename is rolled back and nothing is announced
    assert!(outcome.value);
    assert!(outcome.events.is_empty());
    assert!(outcome.message.is_empty());
    assert!(h.cache.messages().is_empty());
    assert!(h.audit_lines().is_empty());
    assert_eq!(h.reload(id).name.as_deref(), Some("Original"));
}

#[test]
fn test_scope_error_propagates_and_rolls_back() {
    let mut h = Harness::new();
    let mut doc = h.article("Kept", ROOT_ID);
    let id = doc.id();
    h.reset_recorders();

    let result = h.service.scope(|svc| {
        doc.set_value("body", json!("lost"), None, None)?;
        svc.save(&mut doc)?;
        svc.move_to(id, id)?;
        Ok(())
    });

    assert!(matches!(result, Err(FolioError::InvalidMoveTarget { .. })));
    assert_eq!(
        h.reload(id).get_value("body", None, None, false),
        Some(&json!("Kept body"))
    );
    assert!(h.cache.messages().is_empty());
}

#[test]
fn test_nested_scope_is_rejected() {
    let mut h = Harness::new();
    let mut doc = h.article("Outer", ROOT_ID);

    let outcome = h
        .service
        .scope(|svc| {
            svc.save(&mut doc)?;
            let nested = svc.scope(|_| Ok(()));
            Ok(matches!(nested, Err(FolioError::ScopeAlreadyOpen)))
        })
        .expect("Should run the outer scope");

    assert!(outcome.value);
    assert_eq!(outcome.message.payloads.len(), 1);
}

#[test]
fn test_operations_after_scope_dispatch_on_their_own() {
    let mut h = Harness::new();
    let mut doc = h.article("After", ROOT_ID);
    h.service
        .scope(|svc| {
            svc.save(&mut doc)?;
            Ok(())
        })
        .expect("Should run the scope");
    h.reset_recorders();

    h.service.save(&mut doc).expect("Should save");

    assert_eq!(h.cache.messages().len(), 1);
    assert_eq!(h.audit_lines(), vec!["Saved".to_string()]);
}
