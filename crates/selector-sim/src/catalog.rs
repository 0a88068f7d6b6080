//! JSON-file backed collaborators
//!
//! Stand-ins for the remote catalog and create action, so a selector can be
//! driven end to end from the command line.

use anyhow::Context;
use async_trait::async_trait;
use selector_core::{
    CatalogPage, CatalogQuery, CatalogSearch, CreateResponse, CustomItemCreate, CustomItemDraft,
    EntityAdapter, FieldErrors, PreferredFetch, RemoteError, SortDirection,
};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON array of catalog records
///
/// # Errors
/// Fails if the file cannot be read or is not an array of records.
pub(crate) fn load_records<R: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<R>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))
}

/// Catalog answering from records held in memory
pub(crate) struct JsonCatalog<A: EntityAdapter> {
    records: Vec<A::Record>,
}

impl<A: EntityAdapter> JsonCatalog<A> {
    pub(crate) fn new(records: Vec<A::Record>) -> Self {
        Self { records }
    }

    pub(crate) fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl<A: EntityAdapter> CatalogSearch<A::Record> for JsonCatalog<A> {
    async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage<A::Record>, RemoteError> {
        let mut matching: Vec<(String, &A::Record)> = self
            .records
            .iter()
            .filter_map(|record| {
                let item = A::to_item(record);
                let in_category = query.filters.is_empty()
                    || item
                        .categories
                        .iter()
                        .any(|c| query.filters.categories.contains(c));
                (in_category && item.matches_term(&query.term))
                    .then(|| (item.name.to_lowercase(), record))
            })
            .collect();

        matching.sort_by(|a, b| a.0.cmp(&b.0));
        if query.sort == SortDirection::Descending {
            matching.reverse();
        }

        let total_count = matching.len();
        let items = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, record)| Some(record.clone()))
            .collect();

        tracing::debug!(term = %query.term, offset = query.offset, total_count, "catalog query served");

        Ok(CatalogPage {
            items,
            total_count,
            has_next_page: query.offset + query.limit < total_count,
            has_previous_page: query.offset > 0,
        })
    }
}

#[async_trait]
impl<A: EntityAdapter> PreferredFetch<A::Record> for JsonCatalog<A> {
    async fn fetch_by_uris(&self, uris: &[String]) -> Result<Vec<A::Record>, RemoteError> {
        Ok(uris
            .iter()
            .filter_map(|uri| {
                self.records
                    .iter()
                    .find(|record| A::to_item(record).uri == *uri)
                    .cloned()
            })
            .collect())
    }
}

/// Create action that accepts http(s) uris only
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LocalCreator;

#[async_trait]
impl CustomItemCreate for LocalCreator {
    async fn create(&self, draft: &CustomItemDraft) -> Result<CreateResponse, RemoteError> {
        if draft.uri.starts_with("http://") || draft.uri.starts_with("https://") {
            Ok(CreateResponse::created(draft.uri.clone()))
        } else {
            Ok(CreateResponse::failed(FieldErrors {
                uri: Some("Must be an http or https URL".to_string()),
                ..FieldErrors::default()
            }))
        }
    }
}
