//! Collection and index models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::Named;

/// A collection of a database; identified by `(database, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub stats: Option<CollectionStats>,
}

/// `collStats` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    #[serde(default)]
    pub ns: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub avg_obj_size: f64,
    #[serde(default)]
    pub storage_size: f64,
    #[serde(default)]
    pub capped: bool,
    #[serde(default)]
    pub nindexes: u64,
    #[serde(default)]
    pub total_index_size: f64,
    /// Size of each index, in the order reported by the server.
    #[serde(default)]
    pub index_sizes: Vec<IndexSize>,
}

/// Size of a single index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndexSize {
    pub name: String,
    pub size: f64,
}

/// An index with its usage statistics (`$indexStats`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub name: String,
    /// Key pattern, e.g. `{"name": 1}`.
    #[serde(default)]
    pub key: serde_json::Value,
    #[serde(default)]
    pub accesses: Option<IndexAccess>,
}

/// Usage counter of an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndexAccess {
    #[serde(default)]
    pub ops: u64,
    #[serde(default)]
    pub since: Option<String>,
}

impl IndexInfo {
    /// Number of recorded accesses, if the backend reported any statistics.
    pub fn ops(&self) -> Option<u64> {
        self.accesses.as_ref().map(|a| a.ops)
    }
}

impl Named for CollectionInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for IndexInfo {
    fn name(&self) -> &str {
        &self.name
    }
}
