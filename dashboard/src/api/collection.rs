//! `/api/databases/{db}/collections` endpoints.

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::{CollectionInfo, IndexInfo};

use crate::client::HttpClient;

/// Collection API.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// `GET /api/databases/{db}/collections`
    async fn list(&self, db: &str) -> AppResult<Vec<CollectionInfo>>;

    /// `GET /api/databases/{db}/collections/{collection}/indexes`
    async fn indexes(&self, db: &str, collection: &str) -> AppResult<Vec<IndexInfo>>;
}

pub struct HttpCollectionApi {
    client: HttpClient,
}

impl HttpCollectionApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionApi for HttpCollectionApi {
    async fn list(&self, db: &str) -> AppResult<Vec<CollectionInfo>> {
        self.client.get_json(&["api", "databases", db, "collections"]).await
    }

    async fn indexes(&self, db: &str, collection: &str) -> AppResult<Vec<IndexInfo>> {
        self.client
            .get_json(&["api", "databases", db, "collections", collection, "indexes"])
            .await
    }
}
