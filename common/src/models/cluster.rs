//! Cluster models.
//!
//! Per-host payloads arrive as JSON objects keyed by host. They are held in a
//! [`HostMap`], which iterates hosts in name order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::server::{ServerLog, ServerParameter};

/// Host name to payload, iterated in host name order.
pub type HostMap<T> = BTreeMap<String, T>;

/// Logs of every host of the cluster.
pub type ClusterLogs = HostMap<ServerLog>;

/// Parameters of every host of the cluster.
pub type ClusterParameters = HostMap<Vec<ServerParameter>>;

/// Description of the cluster topology as seen by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescription {
    #[serde(default)]
    pub connection_mode: Option<String>,
    #[serde(default, rename = "type")]
    pub cluster_type: Option<String>,
    #[serde(default)]
    pub settings: Option<ClusterSettings>,
    #[serde(default)]
    pub server_descriptions: Vec<ClusterServerDescription>,
}

/// Driver cluster settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSettings {
    #[serde(default)]
    pub srv_host: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub max_wait_queue_size: Option<u32>,
}

/// One server of the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServerDescription {
    pub address: ClusterServerAddress,
    #[serde(default)]
    pub election_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, rename = "type")]
    pub server_type: Option<String>,
    #[serde(default)]
    pub canonical_address: Option<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub passives: Vec<String>,
    #[serde(default)]
    pub arbiters: Vec<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub round_trip_time_nanos: u64,
    #[serde(default)]
    pub max_document_size: u64,
}

/// Host and port of a cluster server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct ClusterServerAddress {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for ClusterServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
