//! Selector Core
//!
//! Reusable pickable-item selector: search a large remote catalog, narrow
//! the view to a curated preferred subset, select items into a local list,
//! and add custom items, without losing full item detail along the way.
//!
//! # Architecture
//!
//! ```text
//! UI events → Selector<A> → SearchController ──→ CatalogSearch / PreferredFetch
//!                  │     └→ CustomIntake ──────→ CustomItemCreate
//!                  │     └→ DetailCache
//!                  └→ SelectionListener (new ordered list) + NotificationSink
//! ```
//!
//! The selected list is owned by the caller. The selector reports every
//! change through [`SelectionListener::on_change`] and derives its
//! uri-keyed [`SelectionSet`] from that list and the [`DetailCache`].
//!
//! # Example
//!
//! ```rust,ignore
//! use selector_core::prelude::*;
//!
//! # async fn example(collaborators: Collaborators<RepositoryRecord>) -> SelectorResult<()> {
//! let selector = Selector::<RepositoryAdapter>::new(SelectorConfig::new(), collaborators, vec![])?;
//!
//! selector.open().await;
//! selector.search("genomics").await;
//! if let Some(first) = selector.result_page().items.first() {
//!     selector.toggle_selection(first);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod intake;
pub mod item;
pub mod notification;
pub mod remote;
pub mod search;
pub mod selection;
pub mod selector;

// Re-exports for convenience
pub use adapter::{
    EntityAdapter, MetadataStandardAdapter, MetadataStandardRecord, RepositoryAdapter,
    RepositoryRecord,
};
pub use cache::{CacheStats, DetailCache};
pub use config::{SelectorConfig, DEFAULT_PAGE_SIZE};
pub use error::{ConfigError, RemoteError, SelectorError, SelectorResult};
pub use intake::{CustomItemDraft, IntakeState, GENERIC_FAILURE};
pub use item::{EntityKind, Item};
pub use notification::{
    Notification, NotificationKind, NotificationSink, SelectionListener, TracingNotifier,
};
pub use remote::{
    CatalogPage, CatalogQuery, CatalogSearch, CreateResponse, CreatedRecord, CustomItemCreate,
    FieldErrors, PreferredFetch, SearchFilters, SortDirection,
};
pub use search::{page_offset, total_pages, ResultPage, SelectorMode};
pub use selection::{derive_selection, SelectionSet};
pub use selector::{
    Collaborators, PickerState, SearchOutcome, SelectionChange, Selector, SubmitOutcome,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the selector
    pub use crate::{
        Collaborators, CustomItemDraft, EntityAdapter, Item, MetadataStandardAdapter,
        MetadataStandardRecord, RepositoryAdapter, RepositoryRecord, SearchOutcome, Selector,
        SelectorConfig, SelectorResult, SubmitOutcome,
    };
}
