//! Server pages: per-host logs and parameters, replication, current
//! operations and cluster topology.

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use common::errors::{AppError, AppResult};
use common::models::{
    ClusterDescription, ClusterLogs, ClusterParameters, ClusterServerDescription, Operation,
    ReplicationStatus, ServerParameter,
};
use common::utils::{ListView, SortField, SortOrder, SortValue};

use crate::api::Backend;

use super::sequence::Loadable;

/// Picks the tab to show after a fetch: the current one if the host is still
/// present, otherwise the first host in name order.
fn active_host<'a>(
    current: Option<&str>,
    hosts: impl Iterator<Item = &'a String>,
) -> Option<String> {
    let hosts: Vec<&String> = hosts.collect();
    match current {
        Some(host) if hosts.iter().any(|h| h.as_str() == host) => Some(host.to_string()),
        _ => hosts.first().map(|h| h.to_string()),
    }
}

/// Log lines of every cluster host, one tab per host.
pub struct ServerLogView {
    backend: Backend,
    logs: Loadable<ClusterLogs>,
    active: Option<String>,
}

impl ServerLogView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            logs: Loadable::new(),
            active: None,
        }
    }

    /// Fetches `GET /api/cluster/logs`.
    pub async fn load(&mut self) {
        let ticket = self.logs.begin();
        let result = self.backend.cluster.logs().await;
        if self.logs.apply(ticket, result) {
            if let Some(logs) = self.logs.value() {
                self.active = active_host(self.active.as_deref(), logs.keys());
                info!(hosts = logs.len(), "server logs loaded");
            }
        }
    }

    /// Drops the displayed logs and fetches them again.
    pub async fn sync(&mut self) {
        self.logs.clear();
        self.load().await;
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.logs
            .value()
            .map(|logs| logs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn active_host(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switches tab.
    pub fn select_host(&mut self, host: &str) -> AppResult<()> {
        let known = self.logs.value().map(|l| l.contains_key(host)).unwrap_or(false);
        if !known {
            return Err(AppError::NotFound(format!("unknown host: {}", host)));
        }
        self.active = Some(host.to_string());
        Ok(())
    }

    /// Lines of the active host, most recent first.
    pub fn lines(&self) -> &[String] {
        match (self.logs.value(), self.active.as_deref()) {
            (Some(logs), Some(host)) => logs.get(host).map(|l| l.logs.as_slice()).unwrap_or(&[]),
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        self.logs.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.logs.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.logs.error()
    }
}

static PARAMETER_FIELDS: &[SortField<ServerParameter>] = &[SortField {
    key: "name",
    default_order: SortOrder::Asc,
    extract: |p| SortValue::text(&p.name),
}];

/// Displayed parameter; the value is rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ParameterRow {
    pub name: String,
    pub value: String,
}

impl From<&ServerParameter> for ParameterRow {
    fn from(p: &ServerParameter) -> Self {
        let value = match &p.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            name: p.name.clone(),
            value,
        }
    }
}

/// Parameters of every cluster host, filterable by name.
pub struct ServerParametersView {
    backend: Backend,
    parameters: Loadable<ClusterParameters>,
    active: Option<String>,
    list: ListView<ServerParameter>,
}

impl ServerParametersView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            parameters: Loadable::new(),
            active: None,
            list: ListView::new(PARAMETER_FIELDS, "name", SortOrder::Asc),
        }
    }

    /// Fetches `GET /api/cluster/parameters`.
    pub async fn load(&mut self) {
        let ticket = self.parameters.begin();
        let result = self.backend.cluster.parameters().await;
        if self.parameters.apply(ticket, result) {
            if let Some(parameters) = self.parameters.value() {
                self.active = active_host(self.active.as_deref(), parameters.keys());
                info!(hosts = parameters.len(), "server parameters loaded");
            }
            self.refresh();
        }
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.parameters
            .value()
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn active_host(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn select_host(&mut self, host: &str) -> AppResult<()> {
        let known = self
            .parameters
            .value()
            .map(|p| p.contains_key(host))
            .unwrap_or(false);
        if !known {
            return Err(AppError::NotFound(format!("unknown host: {}", host)));
        }
        self.active = Some(host.to_string());
        self.refresh();
        Ok(())
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.list.set_filter(filter);
    }

    pub fn sort_by(&mut self, key: &str) -> AppResult<()> {
        self.list.sort_by(key)
    }

    /// Parameters of the active host, filtered and sorted.
    pub fn rows(&self) -> Vec<ParameterRow> {
        self.list.items().iter().map(ParameterRow::from).collect()
    }

    pub fn error(&self) -> Option<String> {
        self.parameters.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.parameters.error()
    }

    fn refresh(&mut self) {
        let items = match (self.parameters.value(), self.active.as_deref()) {
            (Some(parameters), Some(host)) => parameters.get(host).cloned().unwrap_or_default(),
            _ => Vec::new(),
        };
        self.list.set_items(items);
    }
}

/// Displayed replica set member.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub id: i64,
    pub name: String,
    pub state: Option<String>,
    pub health: Option<String>,
    pub up: bool,
    pub uptime: u64,
}

/// Replica set status; when replication is disabled the backend's message
/// is shown instead.
pub struct ServerReplicationView {
    backend: Backend,
    status: Loadable<ReplicationStatus>,
}

impl ServerReplicationView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            status: Loadable::new(),
        }
    }

    /// Fetches `GET /api/server/replication`.
    pub async fn load(&mut self) {
        let ticket = self.status.begin();
        let result = self.backend.server.replication().await;
        self.status.apply(ticket, result);
    }

    pub fn status(&self) -> Option<&ReplicationStatus> {
        self.status.value()
    }

    pub fn members(&self) -> Vec<MemberRow> {
        self.status
            .value()
            .map(|s| {
                s.members
                    .iter()
                    .map(|m| MemberRow {
                        id: m.id,
                        name: m.name.clone(),
                        state: m.state.as_ref().map(|s| s.name.clone()),
                        health: m.health.as_ref().map(|h| h.name.clone()),
                        up: m.is_up(),
                        uptime: m.uptime,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<String> {
        self.status.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.status.error()
    }
}

/// Operations currently running on the server.
pub struct ServerOperationsView {
    backend: Backend,
    operations: Loadable<Vec<Operation>>,
}

impl ServerOperationsView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            operations: Loadable::new(),
        }
    }

    /// Fetches `GET /api/server/operations`.
    pub async fn load(&mut self) {
        let ticket = self.operations.begin();
        let result = self.backend.server.operations().await;
        self.operations.apply(ticket, result);
    }

    pub fn operations(&self) -> &[Operation] {
        self.operations.value().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<String> {
        self.operations.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.operations.error()
    }
}

/// Cluster topology.
pub struct ClusterView {
    backend: Backend,
    description: Loadable<ClusterDescription>,
}

impl ClusterView {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            description: Loadable::new(),
        }
    }

    /// Fetches `GET /api/cluster`.
    pub async fn load(&mut self) {
        let ticket = self.description.begin();
        let result = self.backend.cluster.describe().await;
        self.description.apply(ticket, result);
    }

    pub fn description(&self) -> Option<&ClusterDescription> {
        self.description.value()
    }

    /// Servers ordered by host, then port.
    pub fn servers(&self) -> Vec<&ClusterServerDescription> {
        let mut servers: Vec<_> = self
            .description
            .value()
            .map(|d| d.server_descriptions.iter().collect())
            .unwrap_or_default();
        servers.sort_by(|a, b| a.address.cmp(&b.address));
        servers
    }

    pub fn error(&self) -> Option<String> {
        self.description.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.description.error()
    }
}
