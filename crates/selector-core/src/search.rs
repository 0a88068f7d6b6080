//! Search controller
//!
//! Decides, for every search, page or filter change, whether to re-filter
//! the preferred subset locally or to query the remote catalog, and owns the
//! last result page.
//!
//! The controller does no I/O. Remote work is returned as a
//! [`PendingQuery`] that the caller executes and feeds back through
//! [`SearchController::apply_remote`] or [`SearchController::fail_remote`].
//!
//! # Stale responses
//!
//! Every issued query and every local refresh bumps a generation counter.
//! A remote response is applied only when its generation is still the
//! latest, so a slow response can never overwrite fresher state.

use crate::config::SelectorConfig;
use crate::error::RemoteError;
use crate::item::Item;
use crate::remote::{CatalogPage, CatalogQuery, SearchFilters, SortDirection};
use serde::{Deserialize, Serialize};

/// Where results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectorMode {
    /// Paginated remote catalog query
    #[default]
    RemotePaged,
    /// Local filter over the preferred subset, single page
    PreferredLocal,
}

/// Number of pages needed for `total_count` items
#[inline]
#[must_use]
pub fn total_pages(total_count: usize, limit: usize) -> usize {
    if limit == 0 {
        0
    } else {
        total_count.div_ceil(limit)
    }
}

/// Item offset of a one-based page
///
/// `None` when the offset does not fit in `usize`.
#[inline]
#[must_use]
pub fn page_offset(page: usize, limit: usize) -> Option<usize> {
    page.saturating_sub(1).checked_mul(limit)
}

/// Results currently on display
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultPage {
    /// Items on this page
    pub items: Vec<Item>,
    /// Total matches across all pages
    pub total_count: usize,
    /// Page size this page was produced with
    pub limit: usize,
    /// One-based page index
    pub current_page: usize,
    /// Whether a later page exists
    pub has_next_page: bool,
    /// Whether an earlier page exists
    pub has_previous_page: bool,
}

impl ResultPage {
    /// Number of pages for the current total
    #[inline]
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.limit)
    }
}

/// Remote query issued by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Generation at issue time
    pub generation: u64,
    /// One-based page the query fetches
    pub page: usize,
    /// Query to send
    pub query: CatalogQuery,
}

/// What the caller must do after a state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// Results were recomputed locally; nothing to fetch
    Local,
    /// Run this remote query
    Remote(PendingQuery),
}

/// Search state for one selector
#[derive(Debug, Clone)]
pub struct SearchController {
    term: String,
    filters: SearchFilters,
    page_size: usize,
    sort: SortDirection,
    current_page: usize,
    preferred_only: bool,
    preferred_uris: Vec<String>,
    preferred_items: Vec<Item>,
    result: ResultPage,
    generation: u64,
    error: Option<String>,
}

impl SearchController {
    /// Create controller from configuration
    #[must_use]
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            term: String::new(),
            filters: config.default_filters.clone(),
            page_size: config.page_size,
            sort: config.sort,
            current_page: 1,
            preferred_only: config.preferred_only,
            preferred_uris: Vec::new(),
            preferred_items: Vec::new(),
            result: ResultPage {
                limit: config.page_size,
                current_page: 1,
                ..ResultPage::default()
            },
            generation: 0,
            error: None,
        }
    }

    /// Active mode
    ///
    /// Preferred-local whenever a preferred list exists and the user has not
    /// opted out.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> SelectorMode {
        if self.preferred_only && !self.preferred_uris.is_empty() {
            SelectorMode::PreferredLocal
        } else {
            SelectorMode::RemotePaged
        }
    }

    /// Current search term
    #[inline]
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Active filters
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Current one-based page
    #[inline]
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Configured page size
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page on display
    #[inline]
    #[must_use]
    pub fn result(&self) -> &ResultPage {
        &self.result
    }

    /// Latest issued generation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Client-visible error from the last failed request
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// User's preferred-only opt-in
    #[inline]
    #[must_use]
    pub fn preferred_only(&self) -> bool {
        self.preferred_only
    }

    /// Preferred uri list
    #[inline]
    #[must_use]
    pub fn preferred_uris(&self) -> &[String] {
        &self.preferred_uris
    }

    /// Fetched preferred items
    #[inline]
    #[must_use]
    pub fn preferred_items(&self) -> &[Item] {
        &self.preferred_items
    }

    /// New search term: clear errors, reset to page 1, refresh
    pub fn begin_search(&mut self, term: &str) -> SearchStep {
        self.term = term.to_string();
        self.error = None;
        self.current_page = 1;
        self.refresh()
    }

    /// Request a remote page
    ///
    /// `None` in preferred-local mode, for page 0, and for a page whose
    /// offset overflows.
    pub fn begin_page(&mut self, page: usize) -> Option<PendingQuery> {
        if page == 0 || self.mode() != SelectorMode::RemotePaged {
            return None;
        }
        let offset = page_offset(page, self.page_size)?;
        Some(self.issue_at(page, offset))
    }

    /// Toggle the preferred-only opt-in
    ///
    /// Opting in without a preferred list is not permitted and returns
    /// `None`, leaving everything unchanged.
    pub fn set_preferred_only(&mut self, preferred_only: bool) -> Option<SearchStep> {
        if preferred_only && self.preferred_uris.is_empty() {
            return None;
        }
        self.preferred_only = preferred_only;
        self.current_page = 1;
        Some(self.refresh())
    }

    /// Replace filters; re-queries page 1 in remote mode
    pub fn set_filters(&mut self, filters: SearchFilters) -> Option<SearchStep> {
        self.filters = filters;
        match self.mode() {
            SelectorMode::RemotePaged => {
                self.current_page = 1;
                Some(self.refresh())
            }
            SelectorMode::PreferredLocal => None,
        }
    }

    /// Replace the preferred uri list
    ///
    /// Previously fetched preferred items are discarded. Returns a step when
    /// the displayed results must change: a local refresh when the new mode
    /// is preferred-local, a page-1 query when the list emptied out of
    /// preferred-local mode.
    pub fn set_preferred_uris(&mut self, uris: Vec<String>) -> Option<SearchStep> {
        let before = self.mode();
        self.preferred_uris = uris;
        self.preferred_items.clear();

        match (before, self.mode()) {
            (_, SelectorMode::PreferredLocal) => Some(self.refresh()),
            (SelectorMode::PreferredLocal, SelectorMode::RemotePaged) => {
                self.current_page = 1;
                Some(self.refresh())
            }
            (SelectorMode::RemotePaged, SelectorMode::RemotePaged) => None,
        }
    }

    /// Store fetched preferred items
    ///
    /// Ignored (returns false) if the preferred list changed while the fetch
    /// was in flight.
    pub fn apply_preferred(&mut self, uris: &[String], items: Vec<Item>) -> bool {
        if self.preferred_uris != uris {
            return false;
        }
        self.preferred_items = items;
        if self.mode() == SelectorMode::PreferredLocal {
            self.refresh();
        }
        true
    }

    /// Recompute results for the current term, page and mode
    pub fn refresh(&mut self) -> SearchStep {
        match self.mode() {
            SelectorMode::PreferredLocal => {
                // Invalidate in-flight remote queries.
                self.generation += 1;
                self.result = self.filter_preferred();
                SearchStep::Local
            }
            SelectorMode::RemotePaged => SearchStep::Remote(self.issue(self.current_page)),
        }
    }

    /// Apply a remote page; false if the response is stale
    pub fn apply_remote(&mut self, pending: &PendingQuery, page: CatalogPage<Item>) -> bool {
        if pending.generation != self.generation {
            return false;
        }

        let items: Vec<Item> = page.items.into_iter().flatten().collect();
        self.current_page = pending.page;
        self.result = ResultPage {
            items,
            total_count: page.total_count,
            limit: pending.query.limit,
            current_page: pending.page,
            has_next_page: page.has_next_page,
            has_previous_page: page.has_previous_page,
        };
        true
    }

    /// Record a failed remote query; the displayed page is kept
    ///
    /// Returns false if the failure belongs to a stale query.
    pub fn fail_remote(&mut self, pending: &PendingQuery, error: &RemoteError) -> bool {
        if pending.generation != self.generation {
            return false;
        }
        self.error = Some(error.to_string());
        true
    }

    /// Record a failed preferred fetch
    ///
    /// Returns false if the preferred list changed while the fetch was in
    /// flight; the error is then dropped.
    pub fn fail_preferred(&mut self, uris: &[String], error: &RemoteError) -> bool {
        if self.preferred_uris != uris {
            return false;
        }
        self.error = Some(error.to_string());
        true
    }

    fn issue(&mut self, page: usize) -> PendingQuery {
        // Refreshes only reissue pages that were already reachable.
        let offset = page_offset(page, self.page_size).unwrap_or_default();
        self.issue_at(page, offset)
    }

    fn issue_at(&mut self, page: usize, offset: usize) -> PendingQuery {
        self.generation += 1;
        PendingQuery {
            generation: self.generation,
            page,
            query: CatalogQuery {
                term: self.term.clone(),
                offset,
                limit: self.page_size,
                filters: self.filters.clone(),
                sort: self.sort,
            },
        }
    }

    fn filter_preferred(&self) -> ResultPage {
        let items: Vec<Item> = self
            .preferred_items
            .iter()
            .filter(|item| item.matches_term(&self.term))
            .cloned()
            .collect();

        ResultPage {
            total_count: items.len(),
            limit: self.page_size.max(items.len()),
            current_page: 1,
            has_next_page: false,
            has_previous_page: false,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SearchController {
        SearchController::new(&SelectorConfig::default())
    }

    fn remote(step: SearchStep) -> PendingQuery {
        match step {
            SearchStep::Remote(pending) => pending,
            SearchStep::Local => panic!("expected remote step"),
        }
    }

    fn page_of(items: Vec<Option<Item>>, total_count: usize) -> CatalogPage<Item> {
        CatalogPage {
            items,
            total_count,
            has_next_page: true,
            has_previous_page: false,
        }
    }

    fn preferred_controller() -> SearchController {
        let mut search = controller();
        search.set_preferred_uris(vec!["a".to_string(), "b".to_string()]);
        search.apply_preferred(
            &["a".to_string(), "b".to_string()],
            vec![
                Item::new("a", "Alpha archive", "genomics data"),
                Item::new("b", "Beta bank", "").with_keywords(["Climate"]),
            ],
        );
        search
    }

    #[test]
    fn pagination_math() {
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(3, 0), 0);
        assert_eq!(page_offset(1, 5), Some(0));
        assert_eq!(page_offset(2, 5), Some(5));
        assert_eq!(page_offset(usize::MAX, 5), None);
    }

    #[test]
    fn default_mode_is_remote() {
        let search = controller();
        assert_eq!(search.mode(), SelectorMode::RemotePaged);
        assert_eq!(search.result().limit, 5);
    }

    #[test]
    fn search_issues_page_one_query() {
        let mut search = controller();
        let pending = remote(search.begin_search("data"));

        assert_eq!(pending.page, 1);
        assert_eq!(pending.query.term, "data");
        assert_eq!(pending.query.offset, 0);
        assert_eq!(pending.query.limit, 5);
        assert_eq!(pending.query.sort, SortDirection::Descending);
    }

    #[test]
    fn page_two_uses_offset_five() {
        let mut search = controller();
        search.begin_search("data");
        let pending = search.begin_page(2).unwrap();

        assert_eq!(pending.query.offset, 5);
        assert_eq!(pending.query.term, "data");
    }

    #[test]
    fn page_zero_is_ignored() {
        let mut search = controller();
        assert!(search.begin_page(0).is_none());
    }

    #[test]
    fn overflowing_page_is_ignored() {
        let mut search = controller();
        search.begin_search("");
        let generation = search.generation();

        assert!(search.begin_page(usize::MAX).is_none());
        assert_eq!(search.generation(), generation);
        assert_eq!(search.current_page(), 1);
    }

    #[test]
    fn apply_remote_drops_null_slots_and_sets_page() {
        let mut search = controller();
        search.begin_search("");
        let pending = search.begin_page(3).unwrap();

        let applied = search.apply_remote(
            &pending,
            page_of(vec![Some(Item::new("u1", "One", "")), None], 12),
        );

        assert!(applied);
        assert_eq!(search.current_page(), 3);
        assert_eq!(search.result().items.len(), 1);
        assert_eq!(search.result().total_pages(), 3);
        assert!(search.result().has_next_page);
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut search = controller();
        let first = remote(search.begin_search("slow"));
        let second = remote(search.begin_search("fast"));

        assert!(search.apply_remote(&second, page_of(vec![Some(Item::new("f", "Fast", ""))], 1)));
        assert!(!search.apply_remote(&first, page_of(vec![Some(Item::new("s", "Slow", ""))], 1)));

        assert_eq!(search.result().items[0].uri, "f");
    }

    #[test]
    fn failure_keeps_previous_page() {
        let mut search = controller();
        let first = remote(search.begin_search(""));
        search.apply_remote(&first, page_of(vec![Some(Item::new("u1", "One", ""))], 1));
        let before = search.result().clone();

        let second = search.begin_page(2).unwrap();
        assert!(search.fail_remote(&second, &RemoteError::transport("down")));

        assert_eq!(search.result(), &before);
        assert_eq!(search.error(), Some("transport failure: down"));
        assert_eq!(search.current_page(), 1);
    }

    #[test]
    fn new_search_clears_error() {
        let mut search = controller();
        let pending = remote(search.begin_search(""));
        search.fail_remote(&pending, &RemoteError::transport("down"));

        search.begin_search("again");
        assert!(search.error().is_none());
    }

    #[test]
    fn preferred_list_enters_local_mode() {
        let search = preferred_controller();
        assert_eq!(search.mode(), SelectorMode::PreferredLocal);
        assert_eq!(search.result().items.len(), 2);
        assert_eq!(search.result().total_pages(), 1);
    }

    #[test]
    fn local_filter_matches_keywords_case_insensitively() {
        let mut search = preferred_controller();
        assert_eq!(search.begin_search("climate"), SearchStep::Local);

        let uris: Vec<_> = search.result().items.iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(uris, vec!["b"]);
    }

    #[test]
    fn local_filter_without_matches_is_empty_single_page() {
        let mut search = preferred_controller();
        search.begin_search("zz");

        let result = search.result();
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 0);
        assert!(!result.has_next_page);
        assert!(!result.has_previous_page);
    }

    #[test]
    fn local_filter_ignores_categories() {
        let mut search = preferred_controller();
        assert!(search.set_filters(SearchFilters::categories(["NONE"])).is_none());
        search.begin_search("");
        assert_eq!(search.result().items.len(), 2);
    }

    #[test]
    fn page_change_ignored_in_local_mode() {
        let mut search = preferred_controller();
        assert!(search.begin_page(2).is_none());
    }

    #[test]
    fn opt_in_without_preferred_list_is_refused() {
        let mut search = controller();
        search.set_preferred_only(false);
        assert!(search.set_preferred_only(true).is_none());
        assert!(!search.preferred_only());
        assert_eq!(search.mode(), SelectorMode::RemotePaged);
    }

    #[test]
    fn opting_out_queries_remote_page_one() {
        let mut search = preferred_controller();
        search.begin_search("alpha");

        let pending = remote(search.set_preferred_only(false).unwrap());
        assert_eq!(search.mode(), SelectorMode::RemotePaged);
        assert_eq!(pending.page, 1);
        assert_eq!(pending.query.term, "alpha");

        assert_eq!(search.set_preferred_only(true), Some(SearchStep::Local));
        assert_eq!(search.result().items.len(), 1);
    }

    #[test]
    fn switching_to_local_invalidates_in_flight_query() {
        let mut search = controller();
        search.set_preferred_only(false);
        let pending = remote(search.begin_search(""));

        search.set_preferred_uris(vec!["a".to_string()]);
        search.set_preferred_only(true);

        assert!(!search.apply_remote(&pending, page_of(vec![Some(Item::new("x", "X", ""))], 1)));
        assert!(search.result().items.is_empty());
    }

    #[test]
    fn emptying_preferred_list_returns_to_remote() {
        let mut search = preferred_controller();
        let step = search.set_preferred_uris(Vec::new()).unwrap();

        assert!(matches!(step, SearchStep::Remote(_)));
        assert_eq!(search.mode(), SelectorMode::RemotePaged);
        assert!(search.preferred_items().is_empty());
    }

    #[test]
    fn stale_preferred_fetch_is_ignored() {
        let mut search = controller();
        search.set_preferred_uris(vec!["a".to_string()]);
        search.set_preferred_uris(vec!["b".to_string()]);

        let applied = search.apply_preferred(&["a".to_string()], vec![Item::new("a", "A", "")]);

        assert!(!applied);
        assert!(search.preferred_items().is_empty());
    }

    #[test]
    fn stale_preferred_failure_is_ignored() {
        let mut search = controller();
        search.set_preferred_uris(vec!["a".to_string()]);
        search.set_preferred_uris(vec!["b".to_string()]);

        let recorded =
            search.fail_preferred(&["a".to_string()], &RemoteError::transport("late"));
        assert!(!recorded);
        assert!(search.error().is_none());

        assert!(search.fail_preferred(&["b".to_string()], &RemoteError::transport("down")));
        assert_eq!(search.error(), Some("transport failure: down"));
    }

    #[test]
    fn filters_requery_in_remote_mode() {
        let mut search = controller();
        let pending = remote(
            search
                .set_filters(SearchFilters::categories(["GENERALIST"]))
                .unwrap(),
        );
        assert_eq!(pending.query.filters.categories, vec!["GENERALIST"]);
        assert_eq!(pending.page, 1);
    }
}
