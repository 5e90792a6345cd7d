#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{code, codes, payload, Harness};
use folio_core::model::CultureSelection;
use folio_core::notifications::ChangeKind;
use folio_core::publishing::PublishResultType;
use folio_core::types::ROOT_ID;
use folio_core::FolioError;
use serde_json::json;

/// Published root with a published, edited child and an unpublished
/// child that has an unpublished grandchild
struct Branch {
    root: i32,
    edited: i32,
    hidden: i32,
    hidden_child: i32,
}

fn branch(h: &mut Harness) -> Branch {
    let root = h.published_article("Root", ROOT_ID);
    let mut edited = h.published_article("Edited", root.id());
    edited
        .set_value("body", json!("Changed"), None, None)
        .expect("Should set");
    h.service.save(&mut edited).expect("Should save");
    let hidden = h.article("Hidden", root.id());
    let hidden_child = h.article("Hidden child", hidden.id());
    h.reset_recorders();
    Branch {
        root: root.id(),
        edited: edited.id(),
        hidden: hidden.id(),
        hidden_child: hidden_child.id(),
    }
}

#[test]
fn test_branch_publish_republishes_only_edited_published_documents() {
    // GIVEN: a branch with edits and unpublished documents
    let mut h = Harness::new();
    let b = branch(&mut h);
    let root = h.reload(b.root);

    // WHEN: it is published without force
    let outcome = h
        .service
        .publish_branch(&root, false, CultureSelection::All)
        .expect("Should publish branch");

    // THEN: only the edited published child is republished
    assert_eq!(codes(&outcome), vec![code(b.edited, "p+p")]);
    assert_eq!(outcome.message.payloads, vec![payload(b.root, ChangeKind::RefreshBranch)]);
    let results: Vec<(i32, PublishResultType)> = outcome
        .value
        .iter()
        .map(|r| (r.document_id, r.result))
        .collect();
    assert_eq!(
        results,
        vec![
            (b.root, PublishResultType::SuccessPublishAlready),
            (b.edited, PublishResultType::SuccessPublish),
        ]
    );
    assert!(!h.reload(b.hidden).published);
    assert_eq!(h.audit_lines(), vec!["Branch published".to_string()]);
}

#[test]
fn test_forced_branch_publish_publishes_unpublished_documents_in_order() {
    let mut h = Harness::new();
    let b = branch(&mut h);
    let root = h.reload(b.root);

    let outcome = h
        .service
        .publish_branch(&root, true, CultureSelection::All)
        .expect("Should publish branch");

    assert_eq!(
        codes(&outcome),
        vec![
            code(b.edited, "p+p"),
            code(b.hidden, "u+p"),
            code(b.hidden_child, "u+p"),
        ]
    );
    assert!(h.service.is_path_published(b.hidden_child).expect("Should check"));
}

#[test]
fn test_branch_publish_publishes_unpublished_root() {
    let mut h = Harness::new();
    let root = h.article("Root", ROOT_ID);
    let child = h.article("Child", root.id());

    let outcome = h
        .service
        .publish_branch(&root, false, CultureSelection::All)
        .expect("Should publish branch");

    assert_eq!(codes(&outcome), vec![code(root.id(), "u+p")]);
    assert!(h.reload(root.id()).published);
    assert!(!h.reload(child.id()).published);
}

#[test]
fn test_failing_document_cuts_its_subtree() {
    // GIVEN: an invalid form with a child under a published root
    let mut h = Harness::new();
    let root = h.published_article("Root", ROOT_ID);
    let mut form = h.service.create("Form", root.id(), "form").expect("Should create");
    h.service.save(&mut form).expect("Should save");
    let below = h.article("Below", form.id());
    h.reset_recorders();

    // WHEN: the branch is force-published
    let outcome = h
        .service
        .publish_branch(&root, true, CultureSelection::All)
        .expect("Should publish branch");

    // THEN: the form fails and nothing below it is touched
    let results: Vec<(i32, PublishResultType)> = outcome
        .value
        .iter()
        .map(|r| (r.document_id, r.result))
        .collect();
    assert_eq!(
        results,
        vec![
            (root.id(), PublishResultType::SuccessPublishAlready),
            (form.id(), PublishResultType::FailedPublishContentInvalid),
        ]
    );
    assert!(outcome.events.is_empty());
    assert!(!h.reload(below.id()).published);
}

#[test]
fn test_failing_root_rolls_back() {
    // GIVEN: an invalid form as branch root, renamed but not saved
    let mut h = Harness::new();
    let mut form = h.service.create("Form", ROOT_ID, "form").expect("Should create");
    h.service.save(&mut form).expect("Should save");
    form.set_name("Renamed");
    h.reset_recorders();

    // WHEN: the branch is published
    let outcome = h
        .service
        .publish_branch(&form, false, CultureSelection::All)
        .expect("Should not error");

    // THEN: the failure is reported and nothing was kept or announced
    assert_eq!(outcome.value.len(), 1);
    assert_eq!(outcome.value[0].result, PublishResultType::FailedPublishContentInvalid);
    assert!(outcome.events.is_empty());
    assert!(h.cache.messages().is_empty());
    assert!(h.audit_lines().is_empty());
    assert_eq!(h.reload(form.id()).name.as_deref(), Some("Form"));
}

#[test]
fn test_branch_publish_of_new_document_is_rejected() {
    let mut h = Harness::new();
    let doc = h.service.create("New", ROOT_ID, "article").expect("Should create");

    let result = h.service.publish_branch(&doc, false, CultureSelection::All);

    assert!(matches!(result, Err(FolioError::BranchPublishNewDocument)));
}

#[test]
fn test_unpublished_parent_masks_published_child() {
    // GIVEN: a published parent with a published child
    let mut h = Harness::new();
    let mut parent = h.published_article("Parent", ROOT_ID);
    let mut child = h.published_article("Child", parent.id());

    // WHEN: the parent is unpublished and the child saved
    let unpublished = h.service.unpublish(&mut parent, "*").expect("Should unpublish");
    assert_eq!(codes(&unpublished), vec![code(parent.id(), "p-u")]);
    child.set_value("body", json!("Edit"), None, None).expect("Should set");
    let saved = h.service.save(&mut child).expect("Should save");

    // THEN: the child is masked
    assert_eq!(codes(&saved), vec![code(child.id(), "p=m")]);
    assert!(!h.service.is_path_published(child.id()).expect("Should check"));

    // WHEN: the parent and then the child are republished
    let parent_again = h
        .service
        .save_and_publish(&mut parent, CultureSelection::All)
        .expect("Should publish parent");
    let child_again = h
        .service
        .save_and_publish(&mut child, CultureSelection::All)
        .expect("Should publish child");

    // THEN: both are visible again
    assert_eq!(codes(&parent_again), vec![code(parent.id(), "u+p")]);
    assert_eq!(
        parent_again.message.payloads,
        vec![payload(parent.id(), ChangeKind::RefreshBranch)]
    );
    assert_eq!(codes(&child_again), vec![code(child.id(), "p+p")]);
    assert!(h.service.is_path_published(child.id()).expect("Should check"));
}

#[test]
fn test_branch_publish_of_variant_pages_publishes_edited_cultures() {
    // GIVEN: a page published in English and French, then edited in French
    let mut h = Harness::new();
    let mut page = h.page(&[("en-US", "Hello"), ("fr-FR", "Bonjour")], ROOT_ID);
    h.service
        .save_and_publish(&mut page, CultureSelection::All)
        .expect("Should publish");
    page.set_value("title", json!("Salut"), Some("fr-FR"), None)
        .expect("Should set");
    h.service.save(&mut page).expect("Should save");
    assert!(h.reload(page.id()).is_culture_edited("fr-FR"));
    h.reset_recorders();

    // WHEN: the branch is published
    let outcome = h
        .service
        .publish_branch(&page, false, CultureSelection::All)
        .expect("Should publish branch");

    // THEN: the French edit is live and English was left alone
    assert_eq!(outcome.value[0].result, PublishResultType::SuccessPublishCulture);
    let stored = h.reload(page.id());
    assert_eq!(
        stored.get_value("title", Some("fr-FR"), None, true),
        Some(&json!("Salut"))
    );
    assert!(!stored.is_culture_edited("fr-FR"));
    assert!(!stored.is_culture_edited("en-US"));
}
