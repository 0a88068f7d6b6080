//! Entity adapters
//!
//! An [`EntityAdapter`] ties a raw catalog record shape to the canonical
//! [`Item`]. The selector is generic over the adapter, so one implementation
//! serves repositories and metadata standards alike.

use crate::item::{EntityKind, Item};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Maps raw catalog records of one entity kind to [`Item`]s
pub trait EntityAdapter: Send + Sync + 'static {
    /// Raw record returned by the remote catalog
    type Record: Clone + Debug + Send + Sync + 'static;

    /// Entity kind tag
    const KIND: EntityKind;

    /// Convert a record to the canonical item shape
    fn to_item(record: &Self::Record) -> Item;
}

/// Repository record as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    /// Catalog identifier, when the catalog assigns one
    #[serde(default)]
    pub id: Option<String>,
    /// Repository URI
    pub uri: String,
    /// Repository name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Home page
    #[serde(default)]
    pub website: Option<String>,
    /// Keywords / subject areas
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Repository types (disciplinary, generalist, ...)
    #[serde(default)]
    pub repository_types: Vec<String>,
}

/// Adapter for repository records
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryAdapter;

impl EntityAdapter for RepositoryAdapter {
    type Record = RepositoryRecord;

    const KIND: EntityKind = EntityKind::Repository;

    fn to_item(record: &Self::Record) -> Item {
        Item {
            id: record.id.clone().unwrap_or_else(|| record.uri.clone()),
            name: record.name.clone(),
            uri: record.uri.clone(),
            description: record.description.clone().unwrap_or_default(),
            keywords: record.keywords.clone(),
            categories: record.repository_types.clone(),
        }
    }
}

/// Metadata standard record as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStandardRecord {
    /// Catalog identifier, when the catalog assigns one
    #[serde(default)]
    pub id: Option<String>,
    /// Standard URI
    pub uri: String,
    /// Standard name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Adapter for metadata standard records
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataStandardAdapter;

impl EntityAdapter for MetadataStandardAdapter {
    type Record = MetadataStandardRecord;

    const KIND: EntityKind = EntityKind::MetadataStandard;

    fn to_item(record: &Self::Record) -> Item {
        Item {
            id: record.id.clone().unwrap_or_else(|| record.uri.clone()),
            name: record.name.clone(),
            uri: record.uri.clone(),
            description: record.description.clone().unwrap_or_default(),
            keywords: record.keywords.clone(),
            categories: Vec::new(),
        }
    }
}
