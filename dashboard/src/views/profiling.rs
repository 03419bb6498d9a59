//! Profiling status edit dialog.
//!
//! The dialog edits a working copy of the status. Cancelling discards it;
//! confirming sends it and closes the dialog only once the backend accepted
//! the change.

use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::ProfilingStatus;

use crate::api::Backend;

/// Which profiler the dialog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "database", rename_all = "lowercase")]
pub enum ProfilingScope {
    /// Server-wide profiler (`PUT /api/profiling/status`).
    Server,
    /// Profiler of one database.
    Database(String),
}

/// Result of a dialog action.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome {
    /// The backend accepted the status it returned; the dialog is done.
    Confirmed(ProfilingStatus),
    /// The update failed; the dialog stays open with its error.
    Open,
    /// The user discarded the edit.
    Cancelled,
}

/// Dialog state.
#[derive(Debug, Clone)]
pub struct ProfilingStatusDialog {
    scope: ProfilingScope,
    working: ProfilingStatus,
    saving: bool,
    failure: Option<AppError>,
}

impl ProfilingStatusDialog {
    /// Opens the dialog on a copy of `current`.
    pub fn open(scope: ProfilingScope, current: &ProfilingStatus) -> Self {
        Self {
            scope,
            working: current.clone(),
            saving: false,
            failure: None,
        }
    }

    pub fn scope(&self) -> &ProfilingScope {
        &self.scope
    }

    /// Working copy being edited.
    pub fn working(&self) -> &ProfilingStatus {
        &self.working
    }

    /// Replaces the working copy.
    pub fn edit(&mut self, status: ProfilingStatus) {
        self.working = status;
    }

    /// Inline message from the last failed confirmation.
    pub fn error(&self) -> Option<String> {
        self.failure.as_ref().map(AppError::display_message)
    }

    /// Error of the last failed confirmation.
    pub fn failure(&self) -> Option<&AppError> {
        self.failure.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Validates and sends the working copy.
    pub async fn confirm(&mut self, backend: &Backend) -> DialogOutcome {
        self.failure = None;

        if let Err(e) = self.working.validate() {
            self.failure = Some(AppError::Validation(e.to_string()));
            return DialogOutcome::Open;
        }

        self.saving = true;
        let result = self.send(backend).await;
        self.saving = false;

        match result {
            Ok(status) => {
                info!(
                    scope = ?self.scope,
                    level = status.level,
                    slow_ms = status.slow_ms,
                    "profiling status updated"
                );
                DialogOutcome::Confirmed(status)
            }
            Err(e) => {
                warn!(scope = ?self.scope, error = %e, "profiling status update rejected");
                self.failure = Some(e);
                DialogOutcome::Open
            }
        }
    }

    /// Discards the working copy.
    pub fn cancel(self) -> DialogOutcome {
        DialogOutcome::Cancelled
    }

    async fn send(&self, backend: &Backend) -> AppResult<ProfilingStatus> {
        match &self.scope {
            ProfilingScope::Server => backend.server.update_profiling_status(&self.working).await,
            ProfilingScope::Database(db) => {
                backend.databases.update_profiling_status(db, &self.working).await
            }
        }
    }
}
