//! Database detail page: summary, collection list and database profiling.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::models::{CollectionInfo, CollectionStats, DatabaseSummary, ProfilingStatus};
use common::utils::{format_size, ListView, SortField, SortOrder, SortValue};

use crate::api::Backend;

use super::indexes::IndexListView;
use super::profiling::{DialogOutcome, ProfilingScope, ProfilingStatusDialog};
use super::sequence::Loadable;

fn stat(c: &CollectionInfo, f: fn(&CollectionStats) -> f64) -> SortValue {
    c.stats.as_ref().map(f).into()
}

static COLLECTION_FIELDS: &[SortField<CollectionInfo>] = &[
    SortField {
        key: "name",
        default_order: SortOrder::Asc,
        extract: |c| SortValue::text(&c.name),
    },
    SortField {
        key: "count",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.count as f64),
    },
    SortField {
        key: "size",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.size),
    },
    SortField {
        key: "storageSize",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.storage_size),
    },
    SortField {
        key: "avgObjSize",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.avg_obj_size),
    },
    SortField {
        key: "nindexes",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.nindexes as f64),
    },
    SortField {
        key: "totalIndexSize",
        default_order: SortOrder::Desc,
        extract: |c| stat(c, |s| s.total_index_size),
    },
    SortField {
        key: "capped",
        default_order: SortOrder::Desc,
        extract: |c| c.stats.as_ref().map(|s| s.capped).into(),
    },
];

/// One displayed collection, sizes formatted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRow {
    pub name: String,
    pub count: Option<u64>,
    pub size: String,
    pub storage_size: String,
    pub avg_obj_size: String,
    pub nindexes: Option<u64>,
    pub total_index_size: String,
    pub capped: bool,
}

impl From<&CollectionInfo> for CollectionRow {
    fn from(c: &CollectionInfo) -> Self {
        let stats = c.stats.as_ref();
        Self {
            name: c.name.clone(),
            count: stats.map(|s| s.count),
            size: format_size(stats.map(|s| s.size)),
            storage_size: format_size(stats.map(|s| s.storage_size)),
            avg_obj_size: format_size(stats.map(|s| s.avg_obj_size)),
            nindexes: stats.map(|s| s.nindexes),
            total_index_size: format_size(stats.map(|s| s.total_index_size)),
            capped: stats.map(|s| s.capped).unwrap_or(false),
        }
    }
}

/// Sortable, filterable collection table.
pub struct CollectionListView {
    list: ListView<CollectionInfo>,
}

impl Default for CollectionListView {
    fn default() -> Self {
        Self {
            list: ListView::new(COLLECTION_FIELDS, "name", SortOrder::Asc),
        }
    }
}

impl CollectionListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_collections(&mut self, collections: Vec<CollectionInfo>) {
        self.list.set_items(collections);
    }

    /// Filters on collection names.
    pub fn set_filter(&mut self, filter: &str) {
        self.list.set_filter(filter);
    }

    /// Selects a sort key. Statistics sort descending when first selected.
    pub fn sort_by(&mut self, key: &str) -> AppResult<()> {
        self.list.sort_by(key)
    }

    pub fn sort_with(&mut self, key: &str, order: SortOrder) -> AppResult<()> {
        self.list.sort_with(key, order)
    }

    pub fn sort_with_default(&mut self, key: &str) -> AppResult<()> {
        self.list.sort_with_default(key)
    }

    pub fn list(&self) -> &ListView<CollectionInfo> {
        &self.list
    }

    pub fn rows(&self) -> Vec<CollectionRow> {
        self.list.items().iter().map(CollectionRow::from).collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.list.source().iter().any(|c| c.name == name)
    }
}

/// Database detail view-model.
pub struct DatabaseView {
    backend: Backend,
    db: String,
    database: Loadable<DatabaseSummary>,
    fetched_collections: Loadable<()>,
    collections: CollectionListView,
    profiling: Loadable<ProfilingStatus>,
    dialog: Option<ProfilingStatusDialog>,
    selected: Option<IndexListView>,
}

impl DatabaseView {
    pub fn new(backend: Backend, db: impl Into<String>) -> Self {
        Self {
            backend,
            db: db.into(),
            database: Loadable::new(),
            fetched_collections: Loadable::new(),
            collections: CollectionListView::new(),
            profiling: Loadable::new(),
            dialog: None,
            selected: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.db
    }

    /// Fetches the database summary, its collections and its profiling status.
    pub async fn load(&mut self) {
        let ticket = self.database.begin();
        let result = self.backend.databases.get(&self.db).await;
        self.database.apply(ticket, result);

        let ticket = self.fetched_collections.begin();
        let result = self.backend.collections.list(&self.db).await;
        if let Some(collections) = self.fetched_collections.accept(ticket, result) {
            info!(db = %self.db, count = collections.len(), "collections loaded");
            self.collections.set_collections(collections);
        }

        let ticket = self.profiling.begin();
        let result = self.backend.databases.profiling_status(&self.db).await;
        self.profiling.apply(ticket, result);
    }

    pub fn database(&self) -> Option<&DatabaseSummary> {
        self.database.value()
    }

    /// First error among the loaded parts.
    pub fn error(&self) -> Option<String> {
        self.failure().map(AppError::display_message)
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.database
            .error()
            .or_else(|| self.fetched_collections.error())
            .or_else(|| self.profiling.error())
    }

    pub fn collections(&self) -> &CollectionListView {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionListView {
        &mut self.collections
    }

    pub fn profiling_status(&self) -> Option<&ProfilingStatus> {
        self.profiling.value()
    }

    /// Selects a collection and loads its indexes.
    pub async fn select_collection(&mut self, name: &str) -> AppResult<&IndexListView> {
        if !self.collections.contains(name) {
            return Err(AppError::NotFound(format!(
                "collection '{}' not found in database '{}'",
                name, self.db
            )));
        }

        let mut indexes = IndexListView::new(self.backend.clone(), self.db.clone(), name);
        indexes.load().await;
        Ok(self.selected.insert(indexes))
    }

    pub fn selected_collection(&self) -> Option<&IndexListView> {
        self.selected.as_ref()
    }

    pub fn selected_collection_mut(&mut self) -> Option<&mut IndexListView> {
        self.selected.as_mut()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Opens the dialog on the database profiling status.
    pub fn open_profiling_dialog(&mut self) -> AppResult<&mut ProfilingStatusDialog> {
        let status = self.profiling.value().ok_or_else(|| {
            AppError::NotFound(format!("profiling status of '{}' is not loaded", self.db))
        })?;
        let scope = ProfilingScope::Database(self.db.clone());
        Ok(self.dialog.insert(ProfilingStatusDialog::open(scope, status)))
    }

    pub fn profiling_dialog(&self) -> Option<&ProfilingStatusDialog> {
        self.dialog.as_ref()
    }

    pub async fn confirm_profiling_dialog(&mut self) -> AppResult<DialogOutcome> {
        let dialog = self
            .dialog
            .as_mut()
            .ok_or_else(|| AppError::NotFound("no profiling dialog is open".to_string()))?;

        let outcome = dialog.confirm(&self.backend).await;
        if let DialogOutcome::Confirmed(status) = &outcome {
            if let Some(current) = self.profiling.value_mut() {
                *current = status.clone();
            }
            self.dialog = None;
        }
        Ok(outcome)
    }

    pub fn cancel_profiling_dialog(&mut self) -> DialogOutcome {
        self.dialog.take().map(|d| d.cancel()).unwrap_or(DialogOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profiling_status, FakeBackend};

    fn names(rows: &[CollectionRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    async fn loaded(fake: &FakeBackend) -> DatabaseView {
        let mut view = DatabaseView::new(fake.backend(), "local");
        view.load().await;
        view
    }

    #[tokio::test]
    async fn test_collections_sorted_by_name() {
        let fake = FakeBackend::new();
        let view = loaded(&fake).await;

        let rows = view.collections().rows();
        assert_eq!(names(&rows), vec!["avengers", "movies"]);
        assert_eq!(rows[1].avg_obj_size, "368 b");
        assert_eq!(rows[0].avg_obj_size, "1.078 Ko");
        assert!(rows[1].capped);
        assert_eq!(view.database().unwrap().name, "local");
    }

    #[tokio::test]
    async fn test_stat_columns_sort_descending_first() {
        let fake = FakeBackend::new();
        let mut view = loaded(&fake).await;
        let collections = view.collections_mut();

        collections.sort_by("nindexes").unwrap();
        assert_eq!(names(&collections.rows()), vec!["avengers", "movies"]);

        collections.sort_by("nindexes").unwrap();
        assert_eq!(names(&collections.rows()), vec!["movies", "avengers"]);

        collections.sort_by("capped").unwrap();
        assert_eq!(names(&collections.rows()), vec!["movies", "avengers"]);
    }

    #[tokio::test]
    async fn test_filter_collections() {
        let fake = FakeBackend::new();
        let mut view = loaded(&fake).await;

        view.collections_mut().set_filter("MOV");
        assert_eq!(names(&view.collections().rows()), vec!["movies"]);

        view.collections_mut().set_filter(" ");
        assert!(view.collections().rows().is_empty());

        view.collections_mut().set_filter("");
        assert_eq!(view.collections().rows().len(), 2);
    }

    #[tokio::test]
    async fn test_select_collection_loads_indexes() {
        let fake = FakeBackend::new();
        let mut view = loaded(&fake).await;

        let indexes = view.select_collection("avengers").await.unwrap();
        assert_eq!(indexes.collection(), "avengers");
        assert_eq!(indexes.indexes().len(), 4);

        assert!(view.select_collection("unknown").await.is_err());
        assert_eq!(view.selected_collection().unwrap().collection(), "avengers");

        view.clear_selection();
        assert!(view.selected_collection().is_none());
    }

    #[tokio::test]
    async fn test_unknown_database_surfaces_message() {
        let fake = FakeBackend::new();
        let mut view = DatabaseView::new(fake.backend(), "missing");
        view.load().await;

        assert!(view.database().is_none());
        assert_eq!(view.error().as_deref(), Some("Database 'missing' does not exist"));
    }

    #[tokio::test]
    async fn test_database_profiling_dialog() {
        let fake = FakeBackend::new();
        let mut view = loaded(&fake).await;
        assert_eq!(view.profiling_status(), Some(&profiling_status(0, 100)));

        view.open_profiling_dialog().unwrap().edit(profiling_status(1, 250));
        let outcome = view.confirm_profiling_dialog().await.unwrap();

        assert_eq!(outcome, DialogOutcome::Confirmed(profiling_status(1, 250)));
        assert_eq!(view.profiling_status(), Some(&profiling_status(1, 250)));
        assert_eq!(
            fake.state().database_profiling.get("local"),
            Some(&profiling_status(1, 250))
        );
    }
}
