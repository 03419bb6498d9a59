//! Handler模块
//!
//! 每个请求创建对应的视图模型，按查询参数恢复排序、过滤与分页状态，
//! 加载后返回视图快照。

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::middleware::RequestId;
use common::models::{
    ClusterDescription, ClusterServerDescription, DatabaseSummary, Operation, ProfileQuery,
    ProfilingStatus, ReplicationStatus, ServerInfo,
};
use common::response::ApiResponse;
use common::utils::{SortOrder, SortState};
use dashboard::api::{QuerySort, SlowQueryRequest};
use dashboard::views::{
    ClusterView, CollectionRow, DashboardView, DatabaseRow, DatabaseView, DialogOutcome,
    IndexListView, IndexRow, MemberRow, ParameterRow, ProfilingScope, ProfilingStatusDialog,
    ServerLogView, ServerOperationsView, ServerParametersView, ServerReplicationView,
    SlowQueryView,
};

use crate::state::AppState;

const SERVICE_NAME: &str = "webapp";

type ViewResult<T> = Result<Json<ApiResponse<T>>, AppError>;

fn respond<T: Serialize>(data: T, request_id: &RequestId) -> ViewResult<T> {
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

fn sort_keys(keys: Vec<&'static str>) -> Vec<String> {
    keys.into_iter().map(String::from).collect()
}

fn ensure_loaded(failure: Option<&AppError>) -> Result<(), AppError> {
    match failure {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    }
}

/// 列表排序与过滤参数
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// 名称过滤
    pub filter: Option<String>,
    /// 排序字段
    pub sort: Option<String>,
    /// 排序方向，缺省时使用字段默认方向
    pub order: Option<SortOrder>,
}

/// 慢查询分页参数
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlowQueryParams {
    /// 页码（从 1 开始）
    #[validate(range(min = 1, message = "页码必须大于 0"))]
    pub page: Option<u64>,
    /// 每页条数
    #[validate(range(min = 1, max = 1000, message = "每页条数必须在 1 到 1000 之间"))]
    pub page_size: Option<u32>,
    /// 排序字段
    pub sort: Option<String>,
    /// 排序方向
    pub order: Option<SortOrder>,
    /// 操作类型过滤
    pub op: Option<String>,
}

/// 主机选择参数
#[derive(Debug, Default, Deserialize)]
pub struct HostParams {
    /// 主机（缺省为第一个主机）
    pub host: Option<String>,
    /// 名称过滤
    pub filter: Option<String>,
}

/// 健康检查
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend_url: state.config.backend_url.clone(),
        timestamp: Utc::now(),
    })
}

/// 控制台首页：服务器概况与数据库列表
#[utoipa::path(
    get,
    path = "/ui/dashboard",
    tag = "dashboard",
    params(
        ("sort" = Option<String>, Query, description = "排序字段: name, sizeOnDisk, collections"),
        ("order" = Option<SortOrder>, Query, description = "排序方向")
    ),
    responses(
        (status = 200, description = "首页快照", body = ApiResponse<DashboardSnapshot>),
        (status = 502, description = "后端不可用")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> ViewResult<DashboardSnapshot> {
    let mut view = DashboardView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    if let Some(sort) = params.sort.as_deref() {
        view.sort_databases_with(sort, params.order)?;
    }

    let server = view
        .server()
        .cloned()
        .ok_or_else(|| AppError::NotFound("server".to_string()))?;
    respond(
        DashboardSnapshot {
            databases: view.databases(),
            server,
        },
        &request_id,
    )
}

/// 数据库详情：集合列表
#[utoipa::path(
    get,
    path = "/ui/databases/{db}",
    tag = "databases",
    params(
        ("db" = String, Path, description = "数据库名称"),
        ("filter" = Option<String>, Query, description = "集合名称过滤"),
        ("sort" = Option<String>, Query, description = "排序字段"),
        ("order" = Option<SortOrder>, Query, description = "排序方向")
    ),
    responses(
        (status = 200, description = "数据库快照", body = ApiResponse<DatabaseSnapshot>),
        (status = 400, description = "排序字段无效"),
        (status = 404, description = "数据库不存在")
    )
)]
pub async fn database(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(db): Path<String>,
    Query(params): Query<ListParams>,
) -> ViewResult<DatabaseSnapshot> {
    let mut view = DatabaseView::new(state.backend.clone(), db);
    view.load().await;
    ensure_loaded(view.failure())?;

    let collections = view.collections_mut();
    if let Some(filter) = params.filter.as_deref() {
        collections.set_filter(filter);
    }
    if let Some(sort) = params.sort.as_deref() {
        match params.order {
            Some(order) => collections.sort_with(sort, order)?,
            None => collections.sort_with_default(sort)?,
        }
    }

    let database = view
        .database()
        .cloned()
        .ok_or_else(|| AppError::NotFound(view.name().to_string()))?;
    let list = view.collections().list();
    let snapshot = DatabaseSnapshot {
        database,
        filter: list.filter().to_string(),
        sort: list.sort().clone(),
        sort_keys: sort_keys(list.sort_keys()),
        collections: view.collections().rows(),
        profiling_status: view.profiling_status().cloned(),
    };
    respond(snapshot, &request_id)
}

/// 集合索引列表
#[utoipa::path(
    get,
    path = "/ui/databases/{db}/collections/{collection}/indexes",
    tag = "databases",
    params(
        ("db" = String, Path, description = "数据库名称"),
        ("collection" = String, Path, description = "集合名称"),
        ("sort" = Option<String>, Query, description = "排序字段: name, accesses.ops, accesses.since"),
        ("order" = Option<SortOrder>, Query, description = "排序方向")
    ),
    responses(
        (status = 200, description = "索引快照", body = ApiResponse<IndexesSnapshot>)
    )
)]
pub async fn collection_indexes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((db, collection)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ViewResult<IndexesSnapshot> {
    let mut view = IndexListView::new(state.backend.clone(), db.clone(), collection.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    if let Some(sort) = params.sort.as_deref() {
        match params.order {
            Some(order) => view.sort_with(sort, order)?,
            None => view.sort_with_default(sort)?,
        }
    }

    respond(
        IndexesSnapshot {
            database: db,
            collection,
            sort: view.list().sort().clone(),
            sort_keys: sort_keys(view.list().sort_keys()),
            indexes: view.indexes(),
        },
        &request_id,
    )
}

fn slow_query_request(
    state: &AppState,
    params: SlowQueryParams,
) -> Result<SlowQueryRequest, AppError> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let sort = match params.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(field) => {
            let default = QuerySort::default();
            let order = params.order.unwrap_or(if field == default.field {
                default.order
            } else {
                SortOrder::Asc
            });
            QuerySort::new(field, order)
        }
        None => QuerySort {
            order: params.order.unwrap_or(SortOrder::Desc),
            ..QuerySort::default()
        },
    };

    let mut filters = BTreeMap::new();
    if let Some(op) = params.op {
        filters.insert("op".to_string(), op);
    }

    Ok(SlowQueryRequest {
        page: params.page.unwrap_or(1),
        page_size: params.page_size.or(state.slow_query_page_size()),
        sort,
        filters,
    })
}

/// 慢查询列表（后端分页）
#[utoipa::path(
    get,
    path = "/ui/databases/{db}/slow-queries",
    tag = "profiling",
    params(
        ("db" = String, Path, description = "数据库名称"),
        ("page" = Option<u64>, Query, description = "页码（从 1 开始）"),
        ("pageSize" = Option<u32>, Query, description = "每页条数"),
        ("sort" = Option<String>, Query, description = "排序字段，默认 millis"),
        ("order" = Option<SortOrder>, Query, description = "排序方向"),
        ("op" = Option<String>, Query, description = "操作类型过滤")
    ),
    responses(
        (status = 200, description = "慢查询分页", body = ApiResponse<SlowQueriesSnapshot>),
        (status = 400, description = "分页参数无效")
    )
)]
pub async fn slow_queries(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(db): Path<String>,
    Query(params): Query<SlowQueryParams>,
) -> ViewResult<SlowQueriesSnapshot> {
    let request = slow_query_request(&state, params)?;
    let mut view = SlowQueryView::with_request(state.backend.clone(), db, request);
    view.load().await;
    ensure_loaded(view.failure())?;

    respond(SlowQueriesSnapshot::from_view(&view), &request_id)
}

/// 清空慢查询记录并返回第一页
#[utoipa::path(
    delete,
    path = "/ui/databases/{db}/slow-queries",
    tag = "profiling",
    params(
        ("db" = String, Path, description = "数据库名称")
    ),
    responses(
        (status = 200, description = "清空后的第一页", body = ApiResponse<SlowQueriesSnapshot>)
    )
)]
pub async fn reset_slow_queries(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(db): Path<String>,
) -> ViewResult<SlowQueriesSnapshot> {
    let request = slow_query_request(&state, SlowQueryParams::default())?;
    let mut view = SlowQueryView::with_request(state.backend.clone(), db, request);
    view.reset().await?;
    ensure_loaded(view.failure())?;

    info!(db = %view.database(), "慢查询已清空");
    respond(SlowQueriesSnapshot::from_view(&view), &request_id)
}

async fn update_profiling(
    state: &AppState,
    scope: ProfilingScope,
    status: ProfilingStatus,
) -> Result<ProfilingStatus, AppError> {
    let mut dialog = ProfilingStatusDialog::open(scope, &status);
    match dialog.confirm(&state.backend).await {
        DialogOutcome::Confirmed(status) => Ok(status),
        _ => Err(dialog
            .failure()
            .cloned()
            .unwrap_or_else(|| AppError::Validation("性能分析状态未更新".to_string()))),
    }
}

/// 更新服务器性能分析状态
#[utoipa::path(
    put,
    path = "/ui/profiling/status",
    tag = "profiling",
    request_body = ProfilingStatus,
    responses(
        (status = 200, description = "更新后的状态", body = ApiResponse<ProfilingStatus>),
        (status = 400, description = "状态无效或被后端拒绝")
    )
)]
pub async fn update_server_profiling(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(status): Json<ProfilingStatus>,
) -> ViewResult<ProfilingStatus> {
    let updated = update_profiling(&state, ProfilingScope::Server, status).await?;
    respond(updated, &request_id)
}

/// 更新数据库性能分析状态
#[utoipa::path(
    put,
    path = "/ui/databases/{db}/profiling/status",
    tag = "profiling",
    params(
        ("db" = String, Path, description = "数据库名称")
    ),
    request_body = ProfilingStatus,
    responses(
        (status = 200, description = "更新后的状态", body = ApiResponse<ProfilingStatus>),
        (status = 400, description = "状态无效或被后端拒绝")
    )
)]
pub async fn update_database_profiling(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(db): Path<String>,
    Json(status): Json<ProfilingStatus>,
) -> ViewResult<ProfilingStatus> {
    let updated = update_profiling(&state, ProfilingScope::Database(db), status).await?;
    respond(updated, &request_id)
}

/// 各主机日志
#[utoipa::path(
    get,
    path = "/ui/server/log",
    tag = "server",
    params(
        ("host" = Option<String>, Query, description = "主机，缺省为第一个主机")
    ),
    responses(
        (status = 200, description = "日志快照", body = ApiResponse<LogSnapshot>),
        (status = 404, description = "主机不存在")
    )
)]
pub async fn server_log(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<HostParams>,
) -> ViewResult<LogSnapshot> {
    let mut view = ServerLogView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    if let Some(host) = params.host.as_deref() {
        view.select_host(host)?;
    }

    respond(
        LogSnapshot {
            hosts: view.hosts().into_iter().map(String::from).collect(),
            active_host: view.active_host().map(String::from),
            lines: view.lines().to_vec(),
        },
        &request_id,
    )
}

/// 各主机参数
#[utoipa::path(
    get,
    path = "/ui/server/parameters",
    tag = "server",
    params(
        ("host" = Option<String>, Query, description = "主机，缺省为第一个主机"),
        ("filter" = Option<String>, Query, description = "参数名称过滤")
    ),
    responses(
        (status = 200, description = "参数快照", body = ApiResponse<ParametersSnapshot>),
        (status = 404, description = "主机不存在")
    )
)]
pub async fn server_parameters(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<HostParams>,
) -> ViewResult<ParametersSnapshot> {
    let mut view = ServerParametersView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    if let Some(host) = params.host.as_deref() {
        view.select_host(host)?;
    }
    if let Some(filter) = params.filter.as_deref() {
        view.set_filter(filter);
    }

    respond(
        ParametersSnapshot {
            hosts: view.hosts().into_iter().map(String::from).collect(),
            active_host: view.active_host().map(String::from),
            parameters: view.rows(),
        },
        &request_id,
    )
}

/// 副本集状态
#[utoipa::path(
    get,
    path = "/ui/server/replication",
    tag = "server",
    responses(
        (status = 200, description = "副本集快照", body = ApiResponse<ReplicationSnapshot>),
        (status = 404, description = "未启用副本集")
    )
)]
pub async fn server_replication(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ViewResult<ReplicationSnapshot> {
    let mut view = ServerReplicationView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    let status = view
        .status()
        .cloned()
        .ok_or_else(|| AppError::NotFound("replication status".to_string()))?;
    respond(
        ReplicationSnapshot {
            members: view.members(),
            status,
        },
        &request_id,
    )
}

/// 当前运行的操作
#[utoipa::path(
    get,
    path = "/ui/server/operations",
    tag = "server",
    responses(
        (status = 200, description = "操作列表", body = ApiResponse<Vec<Operation>>)
    )
)]
pub async fn server_operations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ViewResult<Vec<Operation>> {
    let mut view = ServerOperationsView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    respond(view.operations().to_vec(), &request_id)
}

/// 集群拓扑
#[utoipa::path(
    get,
    path = "/ui/cluster",
    tag = "server",
    responses(
        (status = 200, description = "集群快照", body = ApiResponse<ClusterSnapshot>)
    )
)]
pub async fn cluster(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ViewResult<ClusterSnapshot> {
    let mut view = ClusterView::new(state.backend.clone());
    view.load().await;
    ensure_loaded(view.failure())?;

    let description = view
        .description()
        .cloned()
        .ok_or_else(|| AppError::NotFound("cluster description".to_string()))?;
    respond(
        ClusterSnapshot {
            servers: view.servers().into_iter().cloned().collect(),
            description,
        },
        &request_id,
    )
}

/// 未匹配的路由
pub async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::err("NOT_FOUND", "资源不存在").with_service(SERVICE_NAME)),
    )
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 后端地址
    pub backend_url: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}

/// 首页快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub server: ServerInfo,
    pub databases: Vec<DatabaseRow>,
}

/// 数据库快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSnapshot {
    pub database: DatabaseSummary,
    pub collections: Vec<CollectionRow>,
    pub filter: String,
    pub sort: SortState,
    /// 可用的排序字段
    pub sort_keys: Vec<String>,
    pub profiling_status: Option<ProfilingStatus>,
}

/// 索引快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexesSnapshot {
    pub database: String,
    pub collection: String,
    pub sort: SortState,
    pub sort_keys: Vec<String>,
    pub indexes: Vec<IndexRow>,
}

/// 慢查询快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlowQueriesSnapshot {
    pub queries: Vec<SlowQueryRow>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    /// 可选页码
    pub pages: Vec<u64>,
    /// 排序参数，如 `-millis`
    pub sort: String,
    pub filters: BTreeMap<String, String>,
}

impl SlowQueriesSnapshot {
    fn from_view(view: &SlowQueryView) -> Self {
        let (queries, info) = match view.page() {
            Some(page) => (
                page.results.iter().map(SlowQueryRow::from).collect(),
                page.info(),
            ),
            None => (Vec::new(), Default::default()),
        };
        Self {
            queries,
            page: info.page,
            page_size: info.page_size,
            total: info.total,
            pages: view.pagination().pages(),
            sort: view.sort().to_param(),
            filters: view.filters().clone(),
        }
    }
}

/// 慢查询行：原始记录加上展示用的命令文本
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlowQueryRow {
    #[serde(flatten)]
    pub query: ProfileQuery,
    pub command_text: String,
}

impl From<&ProfileQuery> for SlowQueryRow {
    fn from(query: &ProfileQuery) -> Self {
        Self {
            command_text: query.command_text(),
            query: query.clone(),
        }
    }
}

/// 日志快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogSnapshot {
    pub hosts: Vec<String>,
    pub active_host: Option<String>,
    /// 最新的日志在前
    pub lines: Vec<String>,
}

/// 参数快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParametersSnapshot {
    pub hosts: Vec<String>,
    pub active_host: Option<String>,
    pub parameters: Vec<ParameterRow>,
}

/// 副本集快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSnapshot {
    pub status: ReplicationStatus,
    pub members: Vec<MemberRow>,
}

/// 集群快照
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub description: ClusterDescription,
    /// 按地址排序的服务器
    pub servers: Vec<ClusterServerDescription>,
}
