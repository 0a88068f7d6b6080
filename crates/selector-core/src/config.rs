//! Selector configuration

use crate::error::ConfigError;
use crate::remote::{SearchFilters, SortDirection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog page size used unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Selector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Items per remote page
    pub page_size: usize,
    /// Sort direction sent with every remote query
    pub sort: SortDirection,
    /// Filters applied until the user changes them
    pub default_filters: SearchFilters,
    /// Start in preferred-only mode when a preferred list is supplied
    pub preferred_only: bool,
}

impl SelectorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// With sort direction
    #[inline]
    #[must_use]
    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    /// With default filters
    #[inline]
    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.default_filters = filters;
        self
    }

    /// With initial preferred-only opt-in
    #[inline]
    #[must_use]
    pub fn with_preferred_only(mut self, preferred_only: bool) -> Self {
        self.preferred_only = preferred_only;
        self
    }

    /// Check invariants
    ///
    /// # Errors
    /// - `ConfigError::ZeroPageSize` if `page_size` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error on malformed TOML or failed validation
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&source)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortDirection::Descending,
            default_filters: SearchFilters::default(),
            preferred_only: true,
        }
    }
}
