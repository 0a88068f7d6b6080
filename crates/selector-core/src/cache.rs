//! Detail cache using moka
//!
//! Keeps the fullest known representation of every item the user has seen,
//! keyed by uri, so a selected item never regresses to the partial record
//! stored in the caller's selection list.

use crate::item::Item;
use moka::sync::Cache;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Uri-keyed store of full-detail items
///
/// The cache is unbounded and has no expiry: entries live as long as the
/// selector that owns it. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct DetailCache {
    inner: Cache<String, Item>,
}

impl DetailCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().name("detail-cache").build(),
        }
    }

    /// Upsert item by uri (last write wins)
    ///
    /// Items without a uri cannot be keyed and are ignored.
    pub fn remember(&self, item: Item) {
        if !item.is_trackable() {
            tracing::trace!(name = %item.name, "skipping cache insert for item without uri");
            return;
        }
        self.inner.insert(item.uri.clone(), item);
    }

    /// Get cached item
    #[inline]
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Option<Item> {
        self.inner.get(uri)
    }

    /// Check if cache holds uri
    #[inline]
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.inner.contains_key(uri)
    }

    /// Exact number of cached items
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.iter().count()
    }

    /// Whether nothing has been remembered yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for DetailCache {
    fn default() -> Self {
        Self::new()
    }
}
