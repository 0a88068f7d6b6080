//! Selection set derivation
//!
//! The selection set is never stored. It is projected on demand from the
//! caller-visible ordered list and the [`DetailCache`].

use crate::cache::DetailCache;
use crate::item::Item;
use indexmap::IndexMap;

/// Uri-keyed view of the selected items, in list order
pub type SelectionSet = IndexMap<String, Item>;

/// Project the selection set from the selected list and the cache
///
/// Entries without a uri are dropped. Each distinct uri appears once, at the
/// position of its first occurrence, resolved to the cached record when one
/// exists and to the list record otherwise.
#[must_use]
pub fn derive_selection(selected: &[Item], cache: &DetailCache) -> SelectionSet {
    let mut set = SelectionSet::with_capacity(selected.len());

    for item in selected.iter().filter(|item| item.is_trackable()) {
        if set.contains_key(&item.uri) {
            continue;
        }
        let resolved = cache.lookup(&item.uri).unwrap_or_else(|| item.clone());
        set.insert(item.uri.clone(), resolved);
    }

    set
}

/// Find an entry by uri, falling back to id
#[must_use]
pub fn find_selected<'a>(set: &'a SelectionSet, uri_or_id: &str) -> Option<&'a Item> {
    if uri_or_id.is_empty() {
        return None;
    }
    set.get(uri_or_id)
        .or_else(|| set.values().find(|item| item.id == uri_or_id))
}
