//! MongoHero 控制台 Web 服务
//!
//! 通过 REST 后端提供控制台视图，包括：
//! - 服务器概况与数据库列表
//! - 集合、索引与慢查询
//! - 性能分析状态修改
//! - 服务器日志、参数、副本集与集群拓扑

mod handlers;
mod routes;
mod state;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::AppConfig;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "webapp";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MongoHero 控制台 API",
        version = "0.1.0",
        description = "MongoDB 监控控制台视图服务"
    ),
    paths(
        handlers::health_check,
        handlers::dashboard,
        handlers::update_server_profiling,
        handlers::database,
        handlers::collection_indexes,
        handlers::slow_queries,
        handlers::reset_slow_queries,
        handlers::update_database_profiling,
        handlers::server_log,
        handlers::server_parameters,
        handlers::server_replication,
        handlers::server_operations,
        handlers::cluster,
    ),
    components(schemas(
        common::models::ServerInfo,
        common::models::ProfilingStatus,
        common::models::ProfileQuery,
        common::models::Operation,
        common::utils::SortOrder,
        common::utils::SortState,
        handlers::HealthResponse,
        handlers::DashboardSnapshot,
        handlers::DatabaseSnapshot,
        handlers::IndexesSnapshot,
        handlers::SlowQueriesSnapshot,
        handlers::SlowQueryRow,
        handlers::LogSnapshot,
        handlers::ParametersSnapshot,
        handlers::ReplicationSnapshot,
        handlers::ClusterSnapshot,
    )),
    tags(
        (name = "dashboard", description = "首页端点"),
        (name = "databases", description = "数据库与集合端点"),
        (name = "profiling", description = "性能分析端点"),
        (name = "server", description = "服务器与集群端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load_with_service(SERVICE_NAME).context("加载配置失败")?;
    let state = AppState::new(config.clone()).context("创建后端客户端失败")?;

    let app = create_router(state);

    let addr = config.bind_address();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        backend = %config.backend_url,
        "启动服务"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务运行失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// 读取工作目录下的 .env 文件（不存在时忽略），不覆盖已有环境变量
fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}
