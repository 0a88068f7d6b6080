//! Canonical pickable item
//!
//! Every catalog record, whatever its entity kind, is mapped to an [`Item`]
//! before the selector sees it. `uri` is the natural key for selection
//! membership and cache lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity kind served by a selector instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Data repositories
    Repository,
    /// Metadata standards
    MetadataStandard,
}

impl EntityKind {
    /// Plural label used in messages
    #[inline]
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Repository => "repositories",
            EntityKind::MetadataStandard => "metadata standards",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Repository => f.write_str("repository"),
            EntityKind::MetadataStandard => f.write_str("metadata standard"),
        }
    }
}

/// Pickable entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Identifier (equals `uri` for user-created items)
    pub id: String,
    /// Display name
    pub name: String,
    /// Stable natural key
    pub uri: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Search keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Catalog categories (e.g. repository types)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Item {
    /// Create item whose id doubles as its uri
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let uri = uri.into();
        Self {
            id: uri.clone(),
            name: name.into(),
            uri,
            description: description.into(),
            keywords: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// With explicit id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// With keywords
    #[inline]
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// With categories
    #[inline]
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the item can be selected or cached at all
    #[inline]
    #[must_use]
    pub fn is_trackable(&self) -> bool {
        !self.uri.is_empty()
    }

    /// Copy reduced to the fields stored in the caller's selection list
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.uri.clone(), self.name.clone(), self.description.clone())
    }

    /// Case-insensitive substring match on name, description and keywords
    ///
    /// An empty term matches every item. Categories are not consulted.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }
}
