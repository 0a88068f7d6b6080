//! Testing utilities for the selector workspace
//!
//! In-memory collaborators that record their calls, plus fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use selector_core::{
    CatalogPage, CatalogQuery, CatalogSearch, Collaborators, CreateResponse, CustomItemCreate,
    CustomItemDraft, EntityAdapter, Item, Notification, NotificationSink, PreferredFetch,
    RemoteError, RepositoryAdapter, RepositoryRecord, Selector, SelectorConfig,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

/// Catalog backed by a record list
///
/// Matches with the same predicate the selector uses locally and honours
/// category filters. Queries can be held on a gate or made to fail.
pub struct InMemoryCatalog<A: EntityAdapter> {
    records: Vec<A::Record>,
    null_slots: bool,
    queries: Mutex<Vec<CatalogQuery>>,
    fetches: Mutex<Vec<Vec<String>>>,
    failures: Mutex<VecDeque<RemoteError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl<A: EntityAdapter> InMemoryCatalog<A> {
    pub fn new(records: Vec<A::Record>) -> Self {
        Self {
            records,
            null_slots: false,
            queries: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Pad every page with a null slot, like a sparse remote result
    pub fn with_null_slots(mut self) -> Self {
        self.null_slots = true;
        self
    }

    /// Make the next search or fetch fail
    pub fn fail_next(&self, error: RemoteError) {
        self.failures.lock().push_back(error);
    }

    /// Hold the next search for `term` until the returned gate is notified
    pub fn hold(&self, term: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(term.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn queries(&self) -> Vec<CatalogQuery> {
        self.queries.lock().clone()
    }

    pub fn fetches(&self) -> Vec<Vec<String>> {
        self.fetches.lock().clone()
    }

    fn matching(&self, query: &CatalogQuery) -> Vec<A::Record> {
        self.records
            .iter()
            .filter(|record| {
                let item = A::to_item(record);
                item.matches_term(&query.term)
                    && (query.filters.is_empty()
                        || item
                            .categories
                            .iter()
                            .any(|c| query.filters.categories.contains(c)))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<A: EntityAdapter> CatalogSearch<A::Record> for InMemoryCatalog<A> {
    async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage<A::Record>, RemoteError> {
        self.queries.lock().push(query.clone());

        let gate = self.gates.lock().remove(&query.term);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let matching = self.matching(query);
        let total_count = matching.len();
        let mut items: Vec<Option<A::Record>> = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(Some)
            .collect();
        if self.null_slots && items.len() < query.limit {
            items.push(None);
        }

        Ok(CatalogPage {
            items,
            total_count,
            has_next_page: query.offset + query.limit < total_count,
            has_previous_page: query.offset > 0,
        })
    }
}

#[async_trait]
impl<A: EntityAdapter> PreferredFetch<A::Record> for InMemoryCatalog<A> {
    async fn fetch_by_uris(&self, uris: &[String]) -> Result<Vec<A::Record>, RemoteError> {
        self.fetches.lock().push(uris.to_vec());

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        Ok(self
            .records
            .iter()
            .filter(|record| uris.contains(&A::to_item(record).uri))
            .cloned()
            .collect())
    }
}

/// Create action answering from a script, then with plain success
#[derive(Default)]
pub struct ScriptedCreator {
    responses: Mutex<VecDeque<Result<CreateResponse, RemoteError>>>,
    calls: Mutex<Vec<CustomItemDraft>>,
}

impl ScriptedCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<CreateResponse, RemoteError>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<CustomItemDraft> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CustomItemCreate for ScriptedCreator {
    async fn create(&self, draft: &CustomItemDraft) -> Result<CreateResponse, RemoteError> {
        self.calls.lock().push(draft.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(CreateResponse::created(draft.uri.clone())))
    }
}

/// Notification sink that keeps everything it receives
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.seen.lock().iter().filter(|&n| predicate(n)).count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().push(notification.clone());
    }
}

/// Records every list passed to `on_change`
#[derive(Default)]
pub struct RecordingListener {
    lists: Mutex<Vec<Vec<Item>>>,
}

impl RecordingListener {
    pub fn calls(&self) -> Vec<Vec<Item>> {
        self.lists.lock().clone()
    }

    pub fn last(&self) -> Option<Vec<Item>> {
        self.lists.lock().last().cloned()
    }
}

impl selector_core::SelectionListener for RecordingListener {
    fn on_change(&self, items: &[Item]) {
        self.lists.lock().push(items.to_vec());
    }
}

/// Selector wired to recording fakes
pub struct Harness<A: EntityAdapter> {
    pub selector: Selector<A>,
    pub catalog: Arc<InMemoryCatalog<A>>,
    pub creator: Arc<ScriptedCreator>,
    pub notifier: Arc<RecordingNotifier>,
    pub listener: Arc<RecordingListener>,
}

impl<A: EntityAdapter> Harness<A> {
    pub fn new(config: SelectorConfig, catalog: InMemoryCatalog<A>, selected: Vec<Item>) -> Self {
        let catalog = Arc::new(catalog);
        let creator = Arc::new(ScriptedCreator::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let listener = Arc::new(RecordingListener::default());

        let collaborators: Collaborators<A::Record> = Collaborators {
            catalog: catalog.clone(),
            preferred: catalog.clone(),
            creator: creator.clone(),
            notifier: notifier.clone(),
            listener: listener.clone(),
        };
        let selector = Selector::new(config, collaborators, selected).unwrap();

        Self {
            selector,
            catalog,
            creator,
            notifier,
            listener,
        }
    }
}

pub fn repository(uri: &str, name: &str) -> RepositoryRecord {
    RepositoryRecord {
        id: Some(format!("id-{uri}")),
        uri: uri.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} holds research data")),
        website: None,
        keywords: vec!["research".to_string()],
        repository_types: vec!["GENERALIST".to_string()],
    }
}

/// Twelve generalist repositories named "Repository 01" .. "Repository 12"
pub fn sample_repositories() -> Vec<RepositoryRecord> {
    (1..=12)
        .map(|i| repository(&format!("https://repo.example/{i:02}"), &format!("Repository {i:02}")))
        .collect()
}

pub fn repository_harness(records: Vec<RepositoryRecord>) -> Harness<RepositoryAdapter> {
    Harness::new(
        SelectorConfig::default(),
        InMemoryCatalog::new(records),
        Vec::new(),
    )
}
