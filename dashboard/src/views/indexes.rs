//! Index list of one collection, with usage alerts.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::models::IndexInfo;
use common::utils::{ListView, SortField, SortOrder, SortValue};

use crate::api::Backend;

use super::sequence::Loadable;

/// Sort key of the default ordering, most used first.
pub const OPS_KEY: &str = "accesses.ops";

static INDEX_FIELDS: &[SortField<IndexInfo>] = &[
    SortField {
        key: "name",
        default_order: SortOrder::Asc,
        extract: |i| SortValue::text(&i.name),
    },
    SortField {
        key: OPS_KEY,
        default_order: SortOrder::Asc,
        extract: |i| i.ops().into(),
    },
    SortField {
        key: "accesses.since",
        default_order: SortOrder::Asc,
        extract: |i| match i.accesses.as_ref().and_then(|a| a.since.as_ref()) {
            Some(since) => SortValue::text(since),
            None => SortValue::Missing,
        },
    },
];

/// How worrying an index's usage is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Never used.
    Danger,
    /// Used fewer than 10 times.
    Warning,
    Normal,
}

impl AlertLevel {
    pub fn of(index: &IndexInfo) -> Self {
        match index.ops() {
            Some(0) => AlertLevel::Danger,
            Some(ops) if ops < 10 => AlertLevel::Warning,
            _ => AlertLevel::Normal,
        }
    }
}

/// One displayed index.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexRow {
    pub name: String,
    pub key: serde_json::Value,
    pub ops: Option<u64>,
    pub since: Option<String>,
    pub alert: AlertLevel,
}

impl From<&IndexInfo> for IndexRow {
    fn from(index: &IndexInfo) -> Self {
        Self {
            name: index.name.clone(),
            key: index.key.clone(),
            ops: index.ops(),
            since: index.accesses.as_ref().and_then(|a| a.since.clone()),
            alert: AlertLevel::of(index),
        }
    }
}

/// Index list view-model.
pub struct IndexListView {
    backend: Backend,
    db: String,
    collection: String,
    fetched: Loadable<()>,
    indexes: ListView<IndexInfo>,
}

impl IndexListView {
    pub fn new(backend: Backend, db: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            backend,
            db: db.into(),
            collection: collection.into(),
            fetched: Loadable::new(),
            indexes: ListView::new(INDEX_FIELDS, OPS_KEY, SortOrder::Desc),
        }
    }

    /// Fetches the indexes of the collection.
    pub async fn load(&mut self) {
        let ticket = self.fetched.begin();
        let result = self.backend.collections.indexes(&self.db, &self.collection).await;
        if let Some(indexes) = self.fetched.accept(ticket, result) {
            self.indexes.set_items(indexes);
            info!(
                db = %self.db,
                collection = %self.collection,
                count = self.indexes.source().len(),
                "indexes loaded"
            );
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Selects a sort key; a new key sorts ascending, the same key toggles.
    pub fn sort_by(&mut self, key: &str) -> AppResult<()> {
        self.indexes.sort_by(key)
    }

    pub fn sort_with(&mut self, key: &str, order: SortOrder) -> AppResult<()> {
        self.indexes.sort_with(key, order)
    }

    pub fn sort_with_default(&mut self, key: &str) -> AppResult<()> {
        self.indexes.sort_with_default(key)
    }

    pub fn list(&self) -> &ListView<IndexInfo> {
        &self.indexes
    }

    pub fn indexes(&self) -> Vec<IndexRow> {
        self.indexes.items().iter().map(IndexRow::from).collect()
    }

    pub fn error(&self) -> Option<String> {
        self.fetched.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.fetched.error()
    }
}
