//! 控制台路由模块

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// 创建控制台路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/ui/dashboard", get(handlers::dashboard))
        .route("/ui/profiling/status", put(handlers::update_server_profiling))
        .route("/ui/databases/{db}", get(handlers::database))
        .route(
            "/ui/databases/{db}/collections/{collection}/indexes",
            get(handlers::collection_indexes),
        )
        .route(
            "/ui/databases/{db}/slow-queries",
            get(handlers::slow_queries).delete(handlers::reset_slow_queries),
        )
        .route(
            "/ui/databases/{db}/profiling/status",
            put(handlers::update_database_profiling),
        )
        .route("/ui/server/log", get(handlers::server_log))
        .route("/ui/server/parameters", get(handlers::server_parameters))
        .route("/ui/server/replication", get(handlers::server_replication))
        .route("/ui/server/operations", get(handlers::server_operations))
        .route("/ui/cluster", get(handlers::cluster))
}
