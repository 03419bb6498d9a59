//! Server-level models.
//!
//! Mirrors the payloads of the `/api/server/*` endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::Named;

use super::database::DatabaseSummary;
use super::profiling::ProfilingStatus;

/// Snapshot of the server the backend is connected to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Host name of the server.
    pub host: String,
    /// Server version.
    pub version: String,
    /// Uptime in seconds.
    #[serde(default)]
    pub uptime: f64,
    /// Connection counters.
    #[serde(default)]
    pub connections: ServerConnections,
    /// Storage engine descriptor.
    #[serde(default)]
    pub storage_engine: Option<StorageEngine>,
    /// Databases hosted by the server.
    #[serde(default)]
    pub databases: Vec<DatabaseSummary>,
    /// Server-wide profiling status.
    #[serde(default)]
    pub profiling_status: Option<ProfilingStatus>,
}

/// Connection counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerConnections {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub available: u64,
    #[serde(default)]
    pub total_created: u64,
}

/// Storage engine descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageEngine {
    pub name: String,
    #[serde(default)]
    pub supports_committed_reads: bool,
    #[serde(default)]
    pub persistent: bool,
}

/// A server parameter (`getParameter: '*'` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServerParameter {
    pub name: String,
    /// Raw parameter value; parameters may be scalars or documents.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Log lines read from one host, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerLog {
    /// Host the lines were read from, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// An operation currently running on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub op_id: i64,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, rename = "type")]
    pub op_type: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub connection_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub current_op_time: Option<String>,
    #[serde(default)]
    pub secs_running: u64,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub ns: Option<String>,
    #[serde(default)]
    pub waiting_for_lock: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub command: Option<serde_json::Value>,
}

impl Named for ServerParameter {
    fn name(&self) -> &str {
        &self.name
    }
}
