use pretty_assertions::assert_eq;
use selector_core::{Item, Notification, RepositoryAdapter, SelectionChange, SelectorConfig};
use selector_test_utils::{repository_harness, sample_repositories, Harness, InMemoryCatalog};

fn uris(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.uri.as_str()).collect()
}

#[tokio::test]
async fn toggling_a_result_adds_normalized_copy_and_caches_full_item() {
    let h = repository_harness(sample_repositories());
    h.selector.open().await;

    let first = h.selector.result_page().items[0].clone();
    assert!(!first.keywords.is_empty());

    let change = h.selector.toggle_selection(&first);

    assert_eq!(change, SelectionChange::Added);
    assert_eq!(h.listener.calls().len(), 1);
    assert_eq!(h.listener.last().unwrap(), vec![first.normalized()]);

    // Selection set resolves to the cached full record, not the normalized copy.
    let selection = h.selector.selection();
    assert_eq!(selection.get(&first.uri), Some(&first));
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::Added {
            kind: h.selector.kind(),
            name: first.name.clone(),
        }]
    );
}

#[tokio::test]
async fn toggling_twice_restores_selection() {
    let existing = vec![Item::new("https://kept.example", "Kept", "")];
    let h: Harness<RepositoryAdapter> = Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(sample_repositories()),
        existing.clone(),
    );
    h.selector.open().await;
    let item = h.selector.result_page().items[1].clone();

    assert_eq!(h.selector.toggle_selection(&item), SelectionChange::Added);
    assert_eq!(h.selector.toggle_selection(&item), SelectionChange::Removed);

    assert_eq!(h.selector.selected_items(), existing);
    assert_eq!(h.listener.calls().len(), 2);
    assert_eq!(
        h.notifier.count(|n| matches!(n, Notification::Removed { .. })),
        1
    );
}

#[test]
fn toggle_appends_in_order_and_removal_keeps_order() {
    let h = repository_harness(Vec::new());
    let a = Item::new("a", "A", "");
    let b = Item::new("b", "B", "");
    let c = Item::new("c", "C", "");

    h.selector.toggle_selection(&a);
    h.selector.toggle_selection(&b);
    h.selector.toggle_selection(&c);
    h.selector.toggle_selection(&b);

    assert_eq!(uris(&h.listener.last().unwrap()), vec!["a", "c"]);
}

#[test]
fn guarded_operations_never_change_selection() {
    let h: Harness<RepositoryAdapter> = Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(Vec::new()),
        vec![Item::new("a", "A", "")],
    );

    assert_eq!(
        h.selector.toggle_selection(&Item::new("", "No uri", "")),
        SelectionChange::Unchanged
    );
    assert!(h.selector.remove_one("nonexistent-uri").is_none());
    assert!(h.selector.remove_one("").is_none());

    assert_eq!(uris(&h.selector.selected_items()), vec!["a"]);
    assert!(h.listener.calls().is_empty());
    assert!(h.notifier.notifications().is_empty());
}

#[test]
fn remove_one_by_uri_or_id_names_the_cached_item() {
    let h: Harness<RepositoryAdapter> = Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(Vec::new()),
        vec![
            Item::new("a", "A", "").with_id("17"),
            Item::new("b", "B", ""),
        ],
    );
    h.selector
        .cache()
        .remember(Item::new("a", "Alpha (full)", "full detail").with_id("17"));

    let removed = h.selector.remove_one("17").unwrap();

    assert_eq!(removed.name, "Alpha (full)");
    assert_eq!(uris(&h.listener.last().unwrap()), vec!["b"]);
    assert_eq!(
        h.notifier.notifications(),
        vec![Notification::Removed {
            kind: h.selector.kind(),
            name: "Alpha (full)".to_string(),
        }]
    );

    assert!(h.selector.remove_one("b").is_some());
    assert!(h.selector.selected_items().is_empty());
}

#[test]
fn remove_all_clears_and_notifies_once() {
    let h: Harness<RepositoryAdapter> = Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(Vec::new()),
        vec![
            Item::new("a", "A", ""),
            Item::new("b", "B", ""),
            Item::new("c", "C", ""),
        ],
    );

    h.selector.remove_all();

    assert!(h.selector.selection().is_empty());
    assert_eq!(h.listener.calls(), vec![Vec::<Item>::new()]);
    assert_eq!(
        h.notifier
            .count(|n| matches!(n, Notification::AllRemoved { .. })),
        1
    );
}

#[test]
fn synced_list_is_the_source_of_truth() {
    let h = repository_harness(Vec::new());
    h.selector.toggle_selection(&Item::new("a", "A", "full").with_keywords(["k"]));

    // Caller rejects the change and pushes its own list back.
    h.selector.sync_selected(vec![Item::new("z", "Z", "")]);

    assert!(!h.selector.is_selected("a"));
    assert!(h.selector.is_selected("z"));
    // Cached detail survives and is reused if the item comes back.
    h.selector.sync_selected(vec![Item::new("a", "A", "")]);
    assert_eq!(h.selector.selection()["a"].keywords, vec!["k".to_string()]);
}

#[test]
fn selection_drops_blank_uris_from_caller_list() {
    let h: Harness<RepositoryAdapter> = Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(Vec::new()),
        vec![Item::new("", "Broken", ""), Item::new("a", "A", "")],
    );

    let selection = h.selector.selection();
    assert_eq!(selection.len(), 1);
    assert!(selection.contains_key("a"));
}
