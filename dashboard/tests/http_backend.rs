//! Drives the reqwest clients and view-models against an axum stand-in for
//! the REST backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use common::config::AppConfig;
use common::models::ProfilingStatus;
use dashboard::api::{Backend, SlowQueryRequest};
use dashboard::views::{
    ClusterView, DashboardView, DatabaseView, DialogOutcome, ServerLogView, ServerReplicationView,
    SlowQueryView,
};
use dashboard::HttpClient;

#[derive(Clone, Default)]
struct Recorded {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    resets: Arc<Mutex<Vec<String>>>,
}

fn server_json() -> Value {
    json!({
        "host": "localhost",
        "version": "3.2.16",
        "uptime": 3600,
        "connections": { "current": 10, "available": 90, "totalCreated": 20 },
        "storageEngine": {
            "name": "WiredTiger",
            "supportsCommittedReads": true,
            "persistent": true
        },
        "databases": [
            { "name": "local", "sizeOnDisk": 4096, "empty": false, "stats": { "collections": 1 } }
        ],
        "profilingStatus": { "level": 1, "slowMs": 100 }
    })
}

async fn server() -> Json<Value> {
    Json(server_json())
}

async fn server_log() -> Json<Value> {
    Json(json!(["second line", "first line"]))
}

async fn server_parameters() -> Json<Value> {
    Json(json!([{ "name": "syncdelay", "value": 60 }]))
}

async fn replication() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": 404,
            "message": "Replication is not enabled",
            "path": "/api/server/replication",
            "timestamp": 1_560_000_000_000_i64
        })),
    )
}

async fn reject_profiling(Json(_): Json<Value>) -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "status": 400, "message": "denied" })))
}

async fn echo_profiling(Path(_db): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn databases() -> Json<Value> {
    Json(server_json()["databases"].clone())
}

async fn collections(Path(db): Path<String>) -> impl IntoResponse {
    if db == "broken" {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    Json(json!([
        {
            "name": "movies",
            "stats": {
                "ns": format!("{}.movies", db),
                "count": 178157,
                "size": 65700000,
                "capped": true
            }
        },
        {
            "name": "avengers",
            "stats": { "ns": format!("{}.avengers", db), "count": 364827, "size": 403000000 }
        }
    ]))
    .into_response()
}

async fn database(Path(db): Path<String>) -> impl IntoResponse {
    if db == "local" || db == "my db" {
        return Json(json!({ "name": db, "sizeOnDisk": 4096, "empty": false })).into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Database '{}' does not exist", db) })),
    )
        .into_response()
}

async fn profiling_status(Path(_db): Path<String>) -> Json<Value> {
    Json(json!({ "level": 0, "slowMs": 100 }))
}

async fn indexes(Path((_db, collection)): Path<(String, String)>) -> Json<Value> {
    Json(json!([
        { "name": "_id_", "key": { "_id": 1 }, "accesses": { "ops": 12 } },
        { "name": format!("{}_name", collection), "key": { "name": 1 }, "accesses": { "ops": 0 } }
    ]))
}

async fn slow_queries(
    State(recorded): State<Recorded>,
    Path(_db): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    recorded.queries.lock().unwrap().push(params.clone());

    let page: u64 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u64 = params.get("pageSize").and_then(|p| p.parse().ok()).unwrap_or(20);
    let total = 45_u64;
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let body: Vec<Value> = (start..end)
        .map(|i| json!({ "op": "query", "ns": "local.avengers", "millis": 1000 - i }))
        .collect();

    let mut headers = HeaderMap::new();
    headers.insert("X-Page", HeaderValue::from(page));
    headers.insert("X-Page-Size", HeaderValue::from(page_size));
    headers.insert("X-Total", HeaderValue::from(total));
    (headers, Json(body))
}

async fn reset_queries(State(recorded): State<Recorded>, Path(db): Path<String>) -> StatusCode {
    recorded.resets.lock().unwrap().push(db);
    StatusCode::NO_CONTENT
}

async fn cluster() -> Json<Value> {
    Json(json!({
        "connectionMode": "MULTIPLE",
        "type": "REPLICA_SET",
        "serverDescriptions": [
            { "address": { "host": "mongo2", "port": 27017 }, "state": "CONNECTED" },
            { "address": { "host": "mongo1", "port": 27017 }, "state": "CONNECTED" }
        ]
    }))
}

async fn cluster_logs() -> Json<Value> {
    Json(json!({
        "mongo2:27017": { "logs": ["b"] },
        "mongo1:27017": { "logs": ["a2", "a1"] }
    }))
}

async fn cluster_parameters() -> Json<Value> {
    Json(json!({ "mongo1:27017": [{ "name": "syncdelay", "value": 60 }] }))
}

fn router(recorded: Recorded) -> Router {
    Router::new()
        .route("/api/server", get(server))
        .route("/api/server/log", get(server_log))
        .route("/api/server/parameters", get(server_parameters))
        .route("/api/server/operations", get(|| async { Json(json!([])) }))
        .route("/api/server/replication", get(replication))
        .route("/api/profiling/status", put(reject_profiling))
        .route("/api/databases", get(databases))
        .route("/api/databases/{db}", get(database))
        .route("/api/databases/{db}/collections", get(collections))
        .route("/api/databases/{db}/collections/{collection}/indexes", get(indexes))
        .route(
            "/api/databases/{db}/profiling/queries",
            get(slow_queries).delete(reset_queries),
        )
        .route(
            "/api/databases/{db}/profiling/status",
            get(profiling_status).put(echo_profiling),
        )
        .route("/api/cluster", get(cluster))
        .route("/api/cluster/logs", get(cluster_logs))
        .route("/api/cluster/parameters", get(cluster_parameters))
        .with_state(recorded)
}

async fn spawn_backend() -> (AppConfig, Recorded) {
    let recorded = Recorded::default();
    let app = router(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (AppConfig::with_backend_url(&format!("http://{}", addr)), recorded)
}

#[tokio::test]
async fn dashboard_renders_database_size() {
    let (config, _) = spawn_backend().await;
    let mut view = DashboardView::new(Backend::from_config(&config).unwrap());
    view.load().await;

    let rows = view.databases();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "local");
    assert_eq!(rows[0].size, "4 Ko");
    assert_eq!(view.server().unwrap().connections.total_created, 20);
}

#[tokio::test]
async fn slow_query_page_metadata_comes_from_headers() {
    let (config, recorded) = spawn_backend().await;
    let backend = Backend::from_config(&config).unwrap();

    let mut request = SlowQueryRequest {
        page: 2,
        page_size: Some(20),
        ..Default::default()
    };
    request.filters.insert("op".to_string(), "query".to_string());
    request.filters.insert("user".to_string(), String::new());

    let mut view = SlowQueryView::with_request(backend, "local", request);
    view.load().await;

    let page = view.page().expect("page should be stored");
    assert_eq!((page.page, page.page_size, page.total), (2, 20, 45));
    assert_eq!(page.results.len(), 20);
    assert_eq!(page.results[0].millis, 980);
    assert_eq!(view.pagination().pages(), vec![1, 2, 3]);

    let sent = recorded.queries.lock().unwrap()[0].clone();
    assert_eq!(sent.get("page").map(String::as_str), Some("2"));
    assert_eq!(sent.get("pageSize").map(String::as_str), Some("20"));
    assert_eq!(sent.get("sort").map(String::as_str), Some("-millis"));
    assert_eq!(sent.get("op").map(String::as_str), Some("query"));
    assert!(!sent.contains_key("user"));
}

#[tokio::test]
async fn ascending_sort_sign_survives_encoding() {
    let (config, recorded) = spawn_backend().await;
    let mut view = SlowQueryView::new(Backend::from_config(&config).unwrap(), "local");
    view.load().await;
    view.sort_by("ns").await.unwrap();

    let sent = recorded.queries.lock().unwrap()[1].clone();
    assert_eq!(sent.get("sort").map(String::as_str), Some("+ns"));
}

#[tokio::test]
async fn reset_deletes_then_refetches() {
    let (config, recorded) = spawn_backend().await;
    let mut view = SlowQueryView::new(Backend::from_config(&config).unwrap(), "local");
    view.load().await;
    view.select_page(3).await.unwrap();

    view.reset().await.unwrap();
    assert_eq!(recorded.resets.lock().unwrap().as_slice(), ["local".to_string()]);
    assert_eq!(view.page().unwrap().page, 1);
}

#[tokio::test]
async fn rejected_profiling_update_keeps_dialog_open() {
    let (config, _) = spawn_backend().await;
    let mut view = DashboardView::new(Backend::from_config(&config).unwrap());
    view.load().await;

    view.open_profiling_dialog().unwrap().edit(ProfilingStatus {
        level: 2,
        slow_ms: 10,
        sample_rate: None,
    });
    let outcome = view.confirm_profiling_dialog().await.unwrap();

    assert_eq!(outcome, DialogOutcome::Open);
    assert_eq!(view.profiling_dialog().unwrap().error().as_deref(), Some("denied"));
    let status = view.server().unwrap().profiling_status.as_ref().unwrap();
    assert_eq!((status.level, status.slow_ms), (1, 100));
}

#[tokio::test]
async fn database_profiling_update_is_applied() {
    let (config, _) = spawn_backend().await;
    let mut view = DatabaseView::new(Backend::from_config(&config).unwrap(), "local");
    view.load().await;

    view.open_profiling_dialog().unwrap().edit(ProfilingStatus {
        level: 1,
        slow_ms: 250,
        sample_rate: Some(0.5),
    });
    let outcome = view.confirm_profiling_dialog().await.unwrap();

    let expected = ProfilingStatus {
        level: 1,
        slow_ms: 250,
        sample_rate: Some(0.5),
    };
    assert_eq!(outcome, DialogOutcome::Confirmed(expected.clone()));
    assert_eq!(view.profiling_status(), Some(&expected));
}

#[tokio::test]
async fn database_view_lists_collections_and_indexes() {
    let (config, _) = spawn_backend().await;
    let mut view = DatabaseView::new(Backend::from_config(&config).unwrap(), "my db");
    view.load().await;

    assert!(view.error().is_none());
    let rows = view.collections().rows();
    assert_eq!(rows[0].name, "avengers");
    assert_eq!(rows[1].size, "64.16 Mb");

    let indexes = view.select_collection("movies").await.unwrap();
    let rows = indexes.indexes();
    assert_eq!(rows[0].name, "_id_");
    assert_eq!(rows[1].name, "movies_name");
}

#[tokio::test]
async fn unknown_database_surfaces_backend_message() {
    let (config, _) = spawn_backend().await;
    let mut view = DatabaseView::new(Backend::from_config(&config).unwrap(), "nope");
    view.load().await;

    assert!(view.database().is_none());
    assert_eq!(view.error().as_deref(), Some("Database 'nope' does not exist"));
}

#[tokio::test]
async fn replication_error_payload_is_decoded() {
    let (config, _) = spawn_backend().await;
    let backend = Backend::from_config(&config).unwrap();

    let err = backend.server.replication().await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    let body = err.error_body().expect("error payload");
    assert_eq!(body.path.as_deref(), Some("/api/server/replication"));
    assert_eq!(body.timestamp, Some(json!(1_560_000_000_000_i64)));

    let mut view = ServerReplicationView::new(backend);
    view.load().await;
    assert_eq!(view.error().as_deref(), Some("Replication is not enabled"));
}

#[tokio::test]
async fn cluster_endpoints() {
    let (config, _) = spawn_backend().await;
    let backend = Backend::from_config(&config).unwrap();

    let mut logs = ServerLogView::new(backend.clone());
    logs.load().await;
    assert_eq!(logs.active_host(), Some("mongo1:27017"));
    assert_eq!(logs.lines(), ["a2".to_string(), "a1".to_string()]);

    let mut cluster = ClusterView::new(backend.clone());
    cluster.load().await;
    assert_eq!(cluster.servers()[0].address.host, "mongo1");

    let parameters = backend.cluster.parameters().await.unwrap();
    assert_eq!(parameters["mongo1:27017"][0].name, "syncdelay");
}

#[tokio::test]
async fn server_endpoints() {
    let (config, _) = spawn_backend().await;
    let backend = Backend::from_config(&config).unwrap();

    assert_eq!(backend.server.log().await.unwrap(), vec!["second line", "first line"]);
    assert_eq!(backend.server.parameters().await.unwrap()[0].value, json!(60));
    assert!(backend.server.operations().await.unwrap().is_empty());
    assert_eq!(backend.databases.list().await.unwrap()[0].size_on_disk, 4096.0);
}

#[tokio::test]
async fn undecodable_body_is_an_invalid_response() {
    let (config, _) = spawn_backend().await;
    let backend = Backend::from_config(&config).unwrap();

    let err = backend.collections.list("broken").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_RESPONSE");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = AppConfig::with_backend_url(&format!("http://{}", addr));
    let client = HttpClient::new(&config).unwrap();
    let backend = Backend::http(client);
    let err = backend.server.get().await.unwrap_err();
    assert_eq!(err.code(), "TRANSPORT_ERROR");
}
