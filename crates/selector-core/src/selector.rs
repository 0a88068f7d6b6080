//! Selector core
//!
//! Composes the detail cache, selection set, search controller and custom
//! intake behind one generic [`Selector`], parameterised over an
//! [`EntityAdapter`].
//!
//! Operations take `&self`. State lives behind a mutex that is never held
//! across an `.await` or while calling a collaborator, so several operations
//! may be in flight on one task and a listener may call back into the
//! selector.

use crate::adapter::EntityAdapter;
use crate::cache::DetailCache;
use crate::config::SelectorConfig;
use crate::error::{RemoteError, SelectorResult};
use crate::intake::{
    classify_response, CreateOutcome, CustomIntake, CustomItemDraft, IntakeState, SubmitGate,
};
use crate::item::{EntityKind, Item};
use crate::notification::{Notification, NotificationSink, SelectionListener};
use crate::remote::{
    CatalogPage, CatalogSearch, CustomItemCreate, FieldErrors, PreferredFetch, SearchFilters,
};
use crate::search::{PendingQuery, ResultPage, SearchController, SearchStep, SelectorMode};
use crate::selection::{derive_selection, find_selected, SelectionSet};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Picker visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    /// Picker hidden
    #[default]
    Closed,
    /// Picker shown
    Open,
}

/// Result of a search, page, filter or mode change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// New results are on display
    Applied,
    /// A newer request superseded this one; nothing changed
    Stale,
    /// Request not permitted in the current mode; nothing changed
    Ignored,
    /// Remote call failed; previous results kept
    Failed(RemoteError),
}

/// Effect of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// Item appended
    Added,
    /// Item removed
    Removed,
    /// Guarded no-op
    Unchanged,
}

/// Result of a custom item submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank field; nothing sent
    Incomplete,
    /// Caller must navigate to this target; selection untouched
    Redirect(String),
    /// Creation failed; errors are on the intake form
    Failed(FieldErrors),
    /// Item created, cached and selected
    Added(Item),
}

/// Injected collaborators for one selector
pub struct Collaborators<R: Send + 'static> {
    /// Remote paginated catalog
    pub catalog: Arc<dyn CatalogSearch<R>>,
    /// Preferred subset fetch
    pub preferred: Arc<dyn PreferredFetch<R>>,
    /// Custom item create action
    pub creator: Arc<dyn CustomItemCreate>,
    /// Toast delivery
    pub notifier: Arc<dyn NotificationSink>,
    /// Receives every new selection list
    pub listener: Arc<dyn SelectionListener>,
}

impl<R: Send + 'static> Clone for Collaborators<R> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            preferred: Arc::clone(&self.preferred),
            creator: Arc::clone(&self.creator),
            notifier: Arc::clone(&self.notifier),
            listener: Arc::clone(&self.listener),
        }
    }
}

#[derive(Debug)]
struct SelectorState {
    picker: PickerState,
    selected: Vec<Item>,
    search: SearchController,
    intake: CustomIntake,
}

/// Pickable-item selector for one entity kind
pub struct Selector<A: EntityAdapter> {
    config: SelectorConfig,
    catalog: Arc<dyn CatalogSearch<A::Record>>,
    preferred: Arc<dyn PreferredFetch<A::Record>>,
    creator: Arc<dyn CustomItemCreate>,
    notifier: Arc<dyn NotificationSink>,
    listener: Arc<dyn SelectionListener>,
    cache: DetailCache,
    state: Mutex<SelectorState>,
}

impl<A: EntityAdapter> fmt::Debug for Selector<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("kind", &A::KIND)
            .field("config", &self.config)
            .field("cache_entries", &self.cache.len())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl<A: EntityAdapter> Selector<A> {
    /// Create selector with an initial selected list
    ///
    /// # Errors
    /// Returns `SelectorError::Config` if the configuration is invalid
    pub fn new(
        config: SelectorConfig,
        collaborators: Collaborators<A::Record>,
        selected: Vec<Item>,
    ) -> SelectorResult<Self> {
        config.validate()?;

        let state = SelectorState {
            picker: PickerState::Closed,
            selected,
            search: SearchController::new(&config),
            intake: CustomIntake::new(),
        };

        Ok(Self {
            config,
            catalog: collaborators.catalog,
            preferred: collaborators.preferred,
            creator: collaborators.creator,
            notifier: collaborators.notifier,
            listener: collaborators.listener,
            cache: DetailCache::new(),
            state: Mutex::new(state),
        })
    }

    /// Entity kind served
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        A::KIND
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Get detail cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Uri-keyed selection derived from the selected list and the cache
    #[must_use]
    pub fn selection(&self) -> SelectionSet {
        let selected = self.state.lock().selected.clone();
        derive_selection(&selected, &self.cache)
    }

    /// Caller-visible ordered selected list
    #[must_use]
    pub fn selected_items(&self) -> Vec<Item> {
        self.state.lock().selected.clone()
    }

    /// Whether uri is selected
    #[must_use]
    pub fn is_selected(&self, uri: &str) -> bool {
        self.state.lock().selected.iter().any(|item| item.uri == uri)
    }

    /// Adopt the caller's selected list
    pub fn sync_selected(&self, selected: Vec<Item>) {
        self.state.lock().selected = selected;
    }

    /// Select an unselected item, deselect a selected one
    ///
    /// The full item is cached before the list changes, so the selection
    /// set keeps its detail even though the list stores a normalized copy.
    pub fn toggle_selection(&self, item: &Item) -> SelectionChange {
        if !item.is_trackable() {
            tracing::trace!(kind = %A::KIND, name = %item.name, "ignoring toggle of item without uri");
            return SelectionChange::Unchanged;
        }

        self.cache.remember(item.clone());

        let (list, change) = {
            let mut state = self.state.lock();
            let change = if state.selected.iter().any(|i| i.uri == item.uri) {
                state.selected.retain(|i| i.uri != item.uri);
                SelectionChange::Removed
            } else {
                state.selected.push(item.normalized());
                SelectionChange::Added
            };
            (state.selected.clone(), change)
        };

        tracing::debug!(kind = %A::KIND, uri = %item.uri, ?change, "selection toggled");
        self.listener.on_change(&list);

        let notification = match change {
            SelectionChange::Removed => Notification::Removed {
                kind: A::KIND,
                name: item.name.clone(),
            },
            _ => Notification::Added {
                kind: A::KIND,
                name: item.name.clone(),
            },
        };
        self.notifier.notify(&notification);

        change
    }

    /// Remove one selected item by uri or id
    ///
    /// Returns the removed item, or `None` when nothing matched.
    pub fn remove_one(&self, uri_or_id: &str) -> Option<Item> {
        let (list, removed) = {
            let mut state = self.state.lock();
            let selection = derive_selection(&state.selected, &self.cache);
            let Some(found) = find_selected(&selection, uri_or_id).cloned() else {
                tracing::trace!(kind = %A::KIND, key = %uri_or_id, "nothing to remove");
                return None;
            };
            state.selected.retain(|item| item.uri != found.uri);
            (state.selected.clone(), found)
        };

        tracing::debug!(kind = %A::KIND, uri = %removed.uri, "selection item removed");
        self.listener.on_change(&list);
        self.notifier.notify(&Notification::Removed {
            kind: A::KIND,
            name: removed.name.clone(),
        });

        Some(removed)
    }

    /// Clear the selection
    pub fn remove_all(&self) {
        let cleared = {
            let mut state = self.state.lock();
            let count = state.selected.len();
            state.selected.clear();
            count
        };

        tracing::debug!(kind = %A::KIND, cleared, "selection cleared");
        self.listener.on_change(&[]);
        self.notifier.notify(&Notification::AllRemoved { kind: A::KIND });
    }

    // ---------------------------------------------------------------------
    // Picker and search
    // ---------------------------------------------------------------------

    /// Picker visibility
    #[must_use]
    pub fn picker_state(&self) -> PickerState {
        self.state.lock().picker
    }

    /// Show the picker and load initial results for an empty term
    pub async fn open(&self) -> SearchOutcome {
        self.state.lock().picker = PickerState::Open;
        tracing::debug!(kind = %A::KIND, "picker opened");
        self.search("").await
    }

    /// Hide the picker; any open intake form is discarded
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.picker = PickerState::Closed;
        state.intake.cancel();
    }

    /// Active mode
    #[must_use]
    pub fn mode(&self) -> SelectorMode {
        self.state.lock().search.mode()
    }

    /// Current search term
    #[must_use]
    pub fn term(&self) -> String {
        self.state.lock().search.term().to_string()
    }

    /// Current one-based page
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.state.lock().search.current_page()
    }

    /// Results on display
    #[must_use]
    pub fn result_page(&self) -> ResultPage {
        self.state.lock().search.result().clone()
    }

    /// Error from the last failed search or preferred fetch
    #[must_use]
    pub fn search_error(&self) -> Option<String> {
        self.state.lock().search.error().map(str::to_string)
    }

    /// Fetched preferred items
    #[must_use]
    pub fn preferred_items(&self) -> Vec<Item> {
        self.state.lock().search.preferred_items().to_vec()
    }

    /// Search for term from page 1
    pub async fn search(&self, term: &str) -> SearchOutcome {
        let step = self.state.lock().search.begin_search(term);
        self.run_step(step).await
    }

    /// Move to a one-based page (remote paged mode only)
    pub async fn change_page(&self, page: usize) -> SearchOutcome {
        let pending = self.state.lock().search.begin_page(page);
        match pending {
            Some(pending) => self.run_query(pending).await,
            None => {
                tracing::trace!(kind = %A::KIND, page, "page change ignored");
                SearchOutcome::Ignored
            }
        }
    }

    /// Opt in to or out of the preferred-only view
    pub async fn set_preferred_only(&self, preferred_only: bool) -> SearchOutcome {
        let step = self.state.lock().search.set_preferred_only(preferred_only);
        match step {
            Some(step) => self.run_step(step).await,
            None => SearchOutcome::Ignored,
        }
    }

    /// Replace category filters
    pub async fn set_filters(&self, filters: SearchFilters) -> SearchOutcome {
        let step = self.state.lock().search.set_filters(filters);
        match step {
            Some(step) => self.run_step(step).await,
            None => SearchOutcome::Ignored,
        }
    }

    /// Replace the preferred uri list and fetch its full detail
    ///
    /// Blank and duplicate uris are dropped. An empty list clears the
    /// preferred subset without a remote call.
    pub async fn set_preferred_uris(&self, uris: Vec<String>) -> SearchOutcome {
        let mut unique: Vec<String> = Vec::with_capacity(uris.len());
        for uri in uris {
            if !uri.is_empty() && !unique.contains(&uri) {
                unique.push(uri);
            }
        }

        let step = self.state.lock().search.set_preferred_uris(unique.clone());
        let step_outcome = match step {
            Some(step) => Some(self.run_step(step).await),
            None => None,
        };

        if unique.is_empty() {
            return step_outcome.unwrap_or(SearchOutcome::Applied);
        }

        tracing::debug!(kind = %A::KIND, count = unique.len(), "fetching preferred subset");
        match self.preferred.fetch_by_uris(&unique).await {
            Ok(records) => {
                let items: Vec<Item> = records.iter().map(A::to_item).collect();
                if self.state.lock().search.apply_preferred(&unique, items) {
                    SearchOutcome::Applied
                } else {
                    tracing::trace!(kind = %A::KIND, "dropping stale preferred subset");
                    SearchOutcome::Stale
                }
            }
            Err(err) => {
                if self.state.lock().search.fail_preferred(&unique, &err) {
                    self.report_search_failure(&err);
                    SearchOutcome::Failed(err)
                } else {
                    tracing::trace!(kind = %A::KIND, "dropping stale preferred failure");
                    SearchOutcome::Stale
                }
            }
        }
    }

    async fn run_step(&self, step: SearchStep) -> SearchOutcome {
        match step {
            SearchStep::Local => SearchOutcome::Applied,
            SearchStep::Remote(pending) => self.run_query(pending).await,
        }
    }

    async fn run_query(&self, pending: PendingQuery) -> SearchOutcome {
        tracing::debug!(
            kind = %A::KIND,
            generation = pending.generation,
            term = %pending.query.term,
            offset = pending.query.offset,
            "issuing catalog query"
        );

        match self.catalog.search(&pending.query).await {
            Ok(page) => {
                let page = CatalogPage {
                    items: page
                        .items
                        .iter()
                        .map(|slot| slot.as_ref().map(A::to_item))
                        .collect(),
                    total_count: page.total_count,
                    has_next_page: page.has_next_page,
                    has_previous_page: page.has_previous_page,
                };

                if self.state.lock().search.apply_remote(&pending, page) {
                    SearchOutcome::Applied
                } else {
                    tracing::trace!(kind = %A::KIND, generation = pending.generation, "dropping stale catalog response");
                    SearchOutcome::Stale
                }
            }
            Err(err) => {
                if self.state.lock().search.fail_remote(&pending, &err) {
                    self.report_search_failure(&err);
                    SearchOutcome::Failed(err)
                } else {
                    SearchOutcome::Stale
                }
            }
        }
    }

    fn report_search_failure(&self, err: &RemoteError) {
        tracing::warn!(kind = %A::KIND, error = %err, "catalog request failed");
        self.notifier.notify(&Notification::SearchFailed {
            kind: A::KIND,
            message: err.to_string(),
        });
    }

    // ---------------------------------------------------------------------
    // Custom item intake
    // ---------------------------------------------------------------------

    /// Intake form state
    #[must_use]
    pub fn intake_state(&self) -> IntakeState {
        self.state.lock().intake.state().clone()
    }

    /// Draft retained from the last submission attempt
    #[must_use]
    pub fn intake_draft(&self) -> CustomItemDraft {
        self.state.lock().intake.draft().clone()
    }

    /// Show the custom item form
    ///
    /// Returns false while the picker is closed or a submission is pending.
    pub fn open_custom_form(&self) -> bool {
        let mut state = self.state.lock();
        if state.picker != PickerState::Open {
            tracing::trace!(kind = %A::KIND, "custom form needs an open picker");
            return false;
        }
        state.intake.open()
    }

    /// Hide the custom item form and clear its draft
    pub fn cancel_custom_form(&self) {
        self.state.lock().intake.cancel();
    }

    /// Validate and submit a custom item
    ///
    /// # Errors
    /// - `SelectorError::IntakeNotOpen` if the form is closed
    /// - `SelectorError::SubmissionInProgress` if a submission is pending
    pub async fn submit_custom_item(&self, draft: CustomItemDraft) -> SelectorResult<SubmitOutcome> {
        let gate = self.state.lock().intake.begin_submit(draft)?;
        let ready = match gate {
            SubmitGate::Incomplete => {
                self.notifier.notify(&Notification::FillAllFields);
                return Ok(SubmitOutcome::Incomplete);
            }
            SubmitGate::Ready(ready) => ready,
        };

        let (outcome, transport) = match self.creator.create(&ready).await {
            Ok(response) => (classify_response(response), None),
            Err(err) => (CreateOutcome::Failed(FieldErrors::default()), Some(err)),
        };

        match outcome {
            CreateOutcome::Redirect(target) => {
                {
                    let mut state = self.state.lock();
                    state.intake.finish();
                    state.picker = PickerState::Closed;
                }
                tracing::info!(kind = %A::KIND, %target, "custom item flow redirected");
                Ok(SubmitOutcome::Redirect(target))
            }
            CreateOutcome::Failed(errors) => {
                match &transport {
                    Some(err) => tracing::error!(
                        kind = %A::KIND,
                        uri = %ready.uri,
                        target = "create custom item",
                        error = %err,
                        "custom item request failed"
                    ),
                    None => tracing::error!(
                        kind = %A::KIND,
                        uri = %ready.uri,
                        target = "create custom item",
                        errors = ?errors,
                        "custom item creation failed"
                    ),
                }
                let shown = self.state.lock().intake.finish_failure(errors);
                Ok(SubmitOutcome::Failed(shown))
            }
            CreateOutcome::Created => {
                let item = ready.to_item();

                let list = {
                    let mut state = self.state.lock();
                    state.intake.finish();
                    state.picker = PickerState::Closed;
                    if state.selected.iter().any(|i| i.uri == item.uri) {
                        None
                    } else {
                        self.cache.remember(item.clone());
                        state.selected.push(item.clone());
                        Some(state.selected.clone())
                    }
                };

                match list {
                    Some(list) => {
                        tracing::info!(kind = %A::KIND, uri = %item.uri, "custom item added");
                        self.listener.on_change(&list);
                    }
                    None => {
                        tracing::info!(kind = %A::KIND, uri = %item.uri, "custom item already selected");
                    }
                }
                self.notifier.notify(&Notification::CustomAdded {
                    kind: A::KIND,
                    name: item.name.clone(),
                });

                Ok(SubmitOutcome::Added(item))
            }
        }
    }
}
