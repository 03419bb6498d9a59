//! `/api/databases` endpoints, including profiling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppResult;
use common::models::{DatabaseSummary, Page, ProfileQuery, ProfilingStatus};
use common::utils::SortOrder;

use crate::client::HttpClient;

/// Server-side sort of slow queries, sent as `sort={+|-}{field}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuerySort {
    pub field: String,
    pub order: SortOrder,
}

impl QuerySort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Query parameter value, e.g. `-millis`.
    pub fn to_param(&self) -> String {
        let sign = match self.order {
            SortOrder::Asc => '+',
            SortOrder::Desc => '-',
        };
        format!("{}{}", sign, self.field)
    }
}

impl Default for QuerySort {
    fn default() -> Self {
        Self::new("millis", SortOrder::Desc)
    }
}

/// Parameters of a slow-query page request.
#[derive(Debug, Clone, PartialEq)]
pub struct SlowQueryRequest {
    /// 1-based page.
    pub page: u64,
    pub page_size: Option<u32>,
    pub sort: QuerySort,
    /// Extra filters such as `op`; empty values are not sent.
    pub filters: BTreeMap<String, String>,
}

impl Default for SlowQueryRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            sort: QuerySort::default(),
            filters: BTreeMap::new(),
        }
    }
}

impl SlowQueryRequest {
    /// Query string pairs, in a stable order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("sort".to_string(), self.sort.to_param()),
        ];
        if let Some(size) = self.page_size {
            query.push(("pageSize".to_string(), size.to_string()));
        }
        query.extend(
            self.filters
                .iter()
                .filter(|(k, v)| !v.trim().is_empty() && !is_reserved(k))
                .map(|(k, v)| (k.clone(), v.trim().to_string())),
        );
        query
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(key, "page" | "pageSize" | "sort")
}

/// Database API.
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// `GET /api/databases`
    async fn list(&self) -> AppResult<Vec<DatabaseSummary>>;

    /// `GET /api/databases/{db}`
    async fn get(&self, db: &str) -> AppResult<DatabaseSummary>;

    /// `GET /api/databases/{db}/profiling/queries`
    async fn profiling_queries(
        &self,
        db: &str,
        request: &SlowQueryRequest,
    ) -> AppResult<Page<ProfileQuery>>;

    /// `DELETE /api/databases/{db}/profiling/queries`
    async fn reset_profiling_queries(&self, db: &str) -> AppResult<()>;

    /// `GET /api/databases/{db}/profiling/status`
    async fn profiling_status(&self, db: &str) -> AppResult<ProfilingStatus>;

    /// `PUT /api/databases/{db}/profiling/status`
    async fn update_profiling_status(
        &self,
        db: &str,
        status: &ProfilingStatus,
    ) -> AppResult<ProfilingStatus>;
}

pub struct HttpDatabaseApi {
    client: HttpClient,
}

impl HttpDatabaseApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseApi for HttpDatabaseApi {
    async fn list(&self) -> AppResult<Vec<DatabaseSummary>> {
        self.client.get_json(&["api", "databases"]).await
    }

    async fn get(&self, db: &str) -> AppResult<DatabaseSummary> {
        self.client.get_json(&["api", "databases", db]).await
    }

    async fn profiling_queries(
        &self,
        db: &str,
        request: &SlowQueryRequest,
    ) -> AppResult<Page<ProfileQuery>> {
        self.client
            .get_page(
                &["api", "databases", db, "profiling", "queries"],
                &request.to_query(),
                request.page,
            )
            .await
    }

    async fn reset_profiling_queries(&self, db: &str) -> AppResult<()> {
        self.client
            .delete(&["api", "databases", db, "profiling", "queries"])
            .await
    }

    async fn profiling_status(&self, db: &str) -> AppResult<ProfilingStatus> {
        self.client
            .get_json(&["api", "databases", db, "profiling", "status"])
            .await
    }

    async fn update_profiling_status(
        &self,
        db: &str,
        status: &ProfilingStatus,
    ) -> AppResult<ProfilingStatus> {
        self.client
            .put_json(&["api", "databases", db, "profiling", "status"], status)
            .await
    }
}
