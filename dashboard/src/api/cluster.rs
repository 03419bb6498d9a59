//! `/api/cluster` endpoints.

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::{ClusterDescription, ClusterLogs, ClusterParameters};

use crate::client::HttpClient;

/// Cluster API.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// `GET /api/cluster`
    async fn describe(&self) -> AppResult<ClusterDescription>;

    /// `GET /api/cluster/logs`, keyed by host.
    async fn logs(&self) -> AppResult<ClusterLogs>;

    /// `GET /api/cluster/parameters`, keyed by host.
    async fn parameters(&self) -> AppResult<ClusterParameters>;
}

pub struct HttpClusterApi {
    client: HttpClient,
}

impl HttpClusterApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for HttpClusterApi {
    async fn describe(&self) -> AppResult<ClusterDescription> {
        self.client.get_json(&["api", "cluster"]).await
    }

    async fn logs(&self) -> AppResult<ClusterLogs> {
        self.client.get_json(&["api", "cluster", "logs"]).await
    }

    async fn parameters(&self) -> AppResult<ClusterParameters> {
        self.client.get_json(&["api", "cluster", "parameters"]).await
    }
}
