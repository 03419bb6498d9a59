//! Database models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::Named;

/// One database of the server, identified by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSummary {
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size_on_disk: f64,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub stats: Option<DatabaseStats>,
}

/// `dbStats` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    #[serde(default)]
    pub collections: u64,
    #[serde(default)]
    pub objects: u64,
    #[serde(default)]
    pub data_size: f64,
    #[serde(default)]
    pub storage_size: f64,
    #[serde(default)]
    pub index_size: f64,
    #[serde(default)]
    pub indexes: u64,
    #[serde(default)]
    pub num_extents: u64,
}

impl Named for DatabaseSummary {
    fn name(&self) -> &str {
        &self.name
    }
}
