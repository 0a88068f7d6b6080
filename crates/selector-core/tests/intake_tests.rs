use pretty_assertions::assert_eq;
use selector_core::{
    CreateResponse, CreatedRecord, CustomItemDraft, FieldErrors, IntakeState, Item, Notification,
    PickerState, RemoteError, SelectorError, SubmitOutcome, GENERIC_FAILURE,
};
use selector_test_utils::{repository, repository_harness, sample_repositories};

#[tokio::test]
async fn custom_item_round_trip() {
    let h = repository_harness(sample_repositories());
    h.selector.open().await;
    assert!(h.selector.open_custom_form());

    let outcome = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    let expected = Item::new("https://x.example", "X", "d");
    assert_eq!(outcome, SubmitOutcome::Added(expected.clone()));

    assert_eq!(h.listener.calls(), vec![vec![expected.clone()]]);
    assert_eq!(h.selector.cache().lookup("https://x.example"), Some(expected));
    assert_eq!(h.selector.intake_state(), IntakeState::Closed);
    assert_eq!(h.selector.picker_state(), PickerState::Closed);
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::CustomAdded {
            kind: h.selector.kind(),
            name: "X".to_string(),
        }]
    );
}

#[tokio::test]
async fn blank_field_is_rejected_locally() {
    let h = repository_harness(Vec::new());
    h.selector.open().await;
    h.selector.open_custom_form();

    let outcome = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "", "d"))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Incomplete);
    assert!(h.creator.calls().is_empty());
    assert_eq!(
        h.notifier
            .count(|n| *n == Notification::FillAllFields),
        1
    );
    assert!(h.listener.calls().is_empty());
    assert_eq!(h.selector.intake_state(), IntakeState::Open);
}

#[tokio::test]
async fn create_receives_trimmed_fields() {
    let h = repository_harness(Vec::new());
    h.selector.open().await;
    h.selector.open_custom_form();

    h.selector
        .submit_custom_item(CustomItemDraft::new(" X ", "\thttps://x.example", "d  "))
        .await
        .unwrap();

    assert_eq!(
        h.creator.calls(),
        vec![CustomItemDraft::new("X", "https://x.example", "d")]
    );
}

#[tokio::test]
async fn field_errors_keep_form_open_with_draft() {
    let h = repository_harness(Vec::new());
    let errors = FieldErrors {
        uri: Some("Must be a valid URL".to_string()),
        ..FieldErrors::default()
    };
    h.creator.push(Ok(CreateResponse::failed(errors.clone())));
    h.selector.open().await;
    h.selector.open_custom_form();

    let draft = CustomItemDraft::new("X", "not a url", "d");
    let outcome = h.selector.submit_custom_item(draft.clone()).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed(errors.clone()));
    assert_eq!(h.selector.intake_state(), IntakeState::OpenWithErrors(errors));
    assert_eq!(h.selector.intake_draft(), draft);
    assert!(h.selector.selected_items().is_empty());
    assert!(h.listener.calls().is_empty());
}

#[tokio::test]
async fn partial_success_is_never_added() {
    let h = repository_harness(Vec::new());
    let errors = FieldErrors {
        name: Some("Name already taken".to_string()),
        ..FieldErrors::default()
    };
    h.creator.push(Ok(CreateResponse {
        success: true,
        data: Some(CreatedRecord {
            uri: "https://x.example".to_string(),
            errors: Some(errors.clone()),
        }),
        ..CreateResponse::default()
    }));
    h.selector.open().await;
    h.selector.open_custom_form();

    let outcome = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed(errors));
    assert!(h.selector.selected_items().is_empty());
    assert!(!h.selector.cache().contains("https://x.example"));
}

#[tokio::test]
async fn failure_then_retry_succeeds() {
    let h = repository_harness(Vec::new());
    h.creator.push(Err(RemoteError::transport("timeout")));
    h.selector.open().await;
    h.selector.open_custom_form();
    let draft = CustomItemDraft::new("X", "https://x.example", "d");

    let first = h.selector.submit_custom_item(draft.clone()).await.unwrap();
    assert_eq!(
        first,
        SubmitOutcome::Failed(FieldErrors::general(GENERIC_FAILURE))
    );

    let second = h.selector.submit_custom_item(draft).await.unwrap();
    assert!(matches!(second, SubmitOutcome::Added(_)));
    assert_eq!(h.creator.calls().len(), 2);
    assert_eq!(h.listener.calls().len(), 1);
}

#[tokio::test]
async fn redirect_closes_picker_without_selecting() {
    let h = repository_harness(sample_repositories());
    h.creator.push(Ok(CreateResponse::redirect("/users/sign_in")));
    h.selector.open().await;
    assert!(h.selector.open_custom_form());

    let outcome = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Redirect("/users/sign_in".to_string()));
    assert_eq!(h.selector.picker_state(), PickerState::Closed);
    assert!(h.listener.calls().is_empty());
    assert!(h.notifier.notifications().is_empty());
}

#[tokio::test]
async fn submit_requires_open_form() {
    let h = repository_harness(Vec::new());

    let result = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await;

    assert!(matches!(result, Err(SelectorError::IntakeNotOpen)));
    assert!(h.creator.calls().is_empty());
}

#[tokio::test]
async fn cancel_clears_draft() {
    let h = repository_harness(Vec::new());
    h.creator.push(Ok(CreateResponse::failed(FieldErrors::default())));
    h.selector.open().await;
    h.selector.open_custom_form();
    h.selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    h.selector.cancel_custom_form();

    assert_eq!(h.selector.intake_state(), IntakeState::Closed);
    assert_eq!(h.selector.intake_draft(), CustomItemDraft::default());
}

#[tokio::test]
async fn created_item_can_be_removed_by_uri() {
    let h = repository_harness(Vec::new());
    h.selector.open().await;
    h.selector.open_custom_form();
    h.selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    let removed = h.selector.remove_one("https://x.example").unwrap();

    assert_eq!(removed.name, "X");
    assert!(h.selector.selected_items().is_empty());
}

#[tokio::test]
async fn custom_form_stays_closed_without_picker() {
    let h = repository_harness(Vec::new());

    assert!(!h.selector.open_custom_form());
    assert_eq!(h.selector.intake_state(), IntakeState::Closed);

    h.selector.open().await;
    assert!(h.selector.open_custom_form());
    h.selector.close();
    assert_eq!(h.selector.intake_state(), IntakeState::Closed);
}

#[tokio::test]
async fn custom_item_already_selected_is_not_duplicated() {
    let h = repository_harness(vec![repository("https://x.example", "Existing")]);
    h.selector.open().await;
    let existing = h.selector.result_page().items[0].clone();
    h.selector.toggle_selection(&existing);
    assert!(h.selector.open_custom_form());

    let outcome = h
        .selector
        .submit_custom_item(CustomItemDraft::new("X", "https://x.example", "d"))
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Added(_)));
    let uris: Vec<String> = h
        .selector
        .selected_items()
        .into_iter()
        .map(|item| item.uri)
        .collect();
    assert_eq!(uris, vec!["https://x.example".to_string()]);
    assert_eq!(h.listener.calls().len(), 1);
    assert_eq!(
        h.selector.cache().lookup("https://x.example").map(|item| item.name),
        Some("Existing".to_string())
    );
    assert_eq!(h.selector.intake_state(), IntakeState::Closed);
}
