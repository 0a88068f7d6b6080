//! Remote collaborators
//!
//! The selector never talks to the network itself. Catalog search, preferred
//! subset fetch and custom item creation are injected as trait objects.

use crate::error::RemoteError;
use crate::intake::CustomItemDraft;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sort direction requested from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending
    #[serde(rename = "ASC")]
    Ascending,
    /// Descending
    #[default]
    #[serde(rename = "DESC")]
    Descending,
}

/// Catalog filters honoured in remote paged mode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to items carrying one of these categories
    #[serde(default)]
    pub categories: Vec<String>,
}

impl SearchFilters {
    /// Filters restricted to categories
    #[must_use]
    pub fn categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether no filter is active
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One offset-based catalog query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Search term (may be empty)
    pub term: String,
    /// Zero-based item offset
    pub offset: usize,
    /// Page size
    pub limit: usize,
    /// Category filters
    pub filters: SearchFilters,
    /// Sort direction
    pub sort: SortDirection,
}

/// One page returned by the catalog
///
/// The catalog may return null slots; they are dropped before display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage<R> {
    /// Records on this page
    pub items: Vec<Option<R>>,
    /// Total matching records across all pages
    pub total_count: usize,
    /// Whether a later page exists
    pub has_next_page: bool,
    /// Whether an earlier page exists
    pub has_previous_page: bool,
}

impl<R> CatalogPage<R> {
    /// Empty page
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

/// Remote paginated catalog search
#[async_trait]
pub trait CatalogSearch<R>: Send + Sync
where
    R: Send + 'static,
{
    /// Run one query
    async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage<R>, RemoteError>;
}

/// Remote unpaginated fetch of a known, small uri list
#[async_trait]
pub trait PreferredFetch<R>: Send + Sync
where
    R: Send + 'static,
{
    /// Fetch full detail for every uri that exists
    async fn fetch_by_uris(&self, uris: &[String]) -> Result<Vec<R>, RemoteError>;
}

/// Field-level and general error messages from a create action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldErrors {
    /// Error not tied to one field
    pub general: Option<String>,
    /// Name field error
    pub name: Option<String>,
    /// Uri field error
    pub uri: Option<String>,
    /// Description field error
    pub description: Option<String>,
}

impl FieldErrors {
    /// Only a general message
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            general: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether no message is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }

    /// All non-blank messages, general first
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [&self.general, &self.name, &self.uri, &self.description]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Record echoed back by a successful create action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedRecord {
    /// Uri of the stored record
    pub uri: String,
    /// Validation errors attached to the stored record
    pub errors: Option<FieldErrors>,
}

/// Envelope returned by the create action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateResponse {
    /// Whether the action succeeded
    pub success: bool,
    /// Navigation target that supersedes the current flow
    pub redirect: Option<String>,
    /// Errors reported by the action itself
    pub errors: FieldErrors,
    /// Stored record, when one was produced
    pub data: Option<CreatedRecord>,
}

impl CreateResponse {
    /// Plain success carrying the stored uri
    #[must_use]
    pub fn created(uri: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(CreatedRecord {
                uri: uri.into(),
                errors: None,
            }),
            ..Self::default()
        }
    }

    /// Failure with errors
    #[must_use]
    pub fn failed(errors: FieldErrors) -> Self {
        Self {
            success: false,
            errors,
            ..Self::default()
        }
    }

    /// Redirect instruction
    #[must_use]
    pub fn redirect(target: impl Into<String>) -> Self {
        Self {
            redirect: Some(target.into()),
            ..Self::default()
        }
    }
}

/// Remote "create custom item" action
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomItemCreate: Send + Sync {
    /// Store a user-supplied item
    async fn create(&self, draft: &CustomItemDraft) -> Result<CreateResponse, RemoteError>;
}
