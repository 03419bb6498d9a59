//! `/api/server` and `/api/profiling` endpoints.

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::{Operation, ProfilingStatus, ReplicationStatus, ServerInfo, ServerParameter};

use crate::client::HttpClient;

/// Server API.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// `GET /api/server`
    async fn get(&self) -> AppResult<ServerInfo>;

    /// `GET /api/server/log`, most recent line first.
    async fn log(&self) -> AppResult<Vec<String>>;

    /// `GET /api/server/parameters`
    async fn parameters(&self) -> AppResult<Vec<ServerParameter>>;

    /// `GET /api/server/operations`
    async fn operations(&self) -> AppResult<Vec<Operation>>;

    /// `GET /api/server/replication`; fails when replication is not enabled.
    async fn replication(&self) -> AppResult<ReplicationStatus>;

    /// `PUT /api/profiling/status`
    async fn update_profiling_status(&self, status: &ProfilingStatus) -> AppResult<ProfilingStatus>;
}

pub struct HttpServerApi {
    client: HttpClient,
}

impl HttpServerApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServerApi for HttpServerApi {
    async fn get(&self) -> AppResult<ServerInfo> {
        self.client.get_json(&["api", "server"]).await
    }

    async fn log(&self) -> AppResult<Vec<String>> {
        self.client.get_json(&["api", "server", "log"]).await
    }

    async fn parameters(&self) -> AppResult<Vec<ServerParameter>> {
        self.client.get_json(&["api", "server", "parameters"]).await
    }

    async fn operations(&self) -> AppResult<Vec<Operation>> {
        self.client.get_json(&["api", "server", "operations"]).await
    }

    async fn replication(&self) -> AppResult<ReplicationStatus> {
        self.client.get_json(&["api", "server", "replication"]).await
    }

    async fn update_profiling_status(
        &self,
        status: &ProfilingStatus,
    ) -> AppResult<ProfilingStatus> {
        self.client.put_json(&["api", "profiling", "status"], status).await
    }
}
