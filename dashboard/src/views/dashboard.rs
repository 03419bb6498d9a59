//! Landing page: server summary, database table and server profiling.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::models::{DatabaseSummary, ServerInfo};
use common::utils::{format_size, ListView, SortField, SortOrder, SortValue};

use crate::api::Backend;

use super::profiling::{DialogOutcome, ProfilingScope, ProfilingStatusDialog};
use super::sequence::Loadable;

static DATABASE_FIELDS: &[SortField<DatabaseSummary>] = &[
    SortField {
        key: "name",
        default_order: SortOrder::Asc,
        extract: |d| SortValue::text(&d.name),
    },
    SortField {
        key: "sizeOnDisk",
        default_order: SortOrder::Desc,
        extract: |d| d.size_on_disk.into(),
    },
    SortField {
        key: "collections",
        default_order: SortOrder::Desc,
        extract: |d| d.stats.as_ref().map(|s| s.collections).into(),
    },
];

/// One row of the database table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRow {
    pub name: String,
    /// Formatted size on disk, e.g. `4 Ko`.
    pub size: String,
    pub collections: Option<u64>,
    pub empty: bool,
}

impl From<&DatabaseSummary> for DatabaseRow {
    fn from(db: &DatabaseSummary) -> Self {
        Self {
            name: db.name.clone(),
            size: format_size(Some(db.size_on_disk)),
            collections: db.stats.as_ref().map(|s| s.collections),
            empty: db.empty,
        }
    }
}

/// Dashboard view-model.
pub struct DashboardView {
    backend: Backend,
    server: Loadable<ServerInfo>,
    databases: ListView<DatabaseSummary>,
    dialog: Option<ProfilingStatusDialog>,
}

impl DashboardView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            server: Loadable::new(),
            databases: ListView::new(DATABASE_FIELDS, "name", SortOrder::Asc),
            dialog: None,
        }
    }

    /// Fetches `GET /api/server`.
    pub async fn load(&mut self) {
        let ticket = self.server.begin();
        let result = self.backend.server.get().await;
        if self.server.apply(ticket, result) {
            if let Some(server) = self.server.value() {
                info!(host = %server.host, databases = server.databases.len(), "dashboard loaded");
                self.databases.set_items(server.databases.clone());
            }
        }
    }

    pub fn server(&self) -> Option<&ServerInfo> {
        self.server.value()
    }

    /// Message of the last failed load.
    pub fn error(&self) -> Option<String> {
        self.server.error_message()
    }

    /// Error of the last failed load.
    pub fn failure(&self) -> Option<&AppError> {
        self.server.error()
    }

    /// Database table rows.
    pub fn databases(&self) -> Vec<DatabaseRow> {
        self.databases.items().iter().map(DatabaseRow::from).collect()
    }

    /// Sorts the database table.
    pub fn sort_databases(&mut self, key: &str) -> AppResult<()> {
        self.databases.sort_by(key)
    }

    /// Sorts the database table in an explicit order, or the field's default.
    pub fn sort_databases_with(&mut self, key: &str, order: Option<SortOrder>) -> AppResult<()> {
        match order {
            Some(order) => self.databases.sort_with(key, order),
            None => self.databases.sort_with_default(key),
        }
    }

    pub fn database_list(&self) -> &ListView<DatabaseSummary> {
        &self.databases
    }

    /// Opens the server profiling dialog on the current status.
    pub fn open_profiling_dialog(&mut self) -> AppResult<&mut ProfilingStatusDialog> {
        let status = self
            .server
            .value()
            .and_then(|s| s.profiling_status.as_ref())
            .ok_or_else(|| {
                AppError::NotFound("server profiling status is not loaded".to_string())
            })?;

        Ok(self
            .dialog
            .insert(ProfilingStatusDialog::open(ProfilingScope::Server, status)))
    }

    pub fn profiling_dialog(&self) -> Option<&ProfilingStatusDialog> {
        self.dialog.as_ref()
    }

    pub fn profiling_dialog_mut(&mut self) -> Option<&mut ProfilingStatusDialog> {
        self.dialog.as_mut()
    }

    /// Confirms the open dialog; on success the displayed status is replaced.
    pub async fn confirm_profiling_dialog(&mut self) -> AppResult<DialogOutcome> {
        let dialog = self
            .dialog
            .as_mut()
            .ok_or_else(|| AppError::NotFound("no profiling dialog is open".to_string()))?;

        let outcome = dialog.confirm(&self.backend).await;
        if let DialogOutcome::Confirmed(status) = &outcome {
            if let Some(server) = self.server.value_mut() {
                server.profiling_status = Some(status.clone());
            }
            self.dialog = None;
        }
        Ok(outcome)
    }

    /// Closes the dialog without sending anything.
    pub fn cancel_profiling_dialog(&mut self) -> DialogOutcome {
        match self.dialog.take() {
            Some(dialog) => dialog.cancel(),
            None => DialogOutcome::Cancelled,
        }
    }
}
