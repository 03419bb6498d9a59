//! In-memory backend for view-model tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use common::errors::{AppError, AppResult, ErrorBody};
use common::models::*;
use common::utils::SortOrder;

use crate::api::{Backend, ClusterApi, CollectionApi, DatabaseApi, ServerApi, SlowQueryRequest};

pub fn backend_error(status: u16, message: &str) -> AppError {
    AppError::Backend {
        status,
        body: Some(ErrorBody::message(message)),
    }
}

pub fn profiling_status(level: i32, slow_ms: i64) -> ProfilingStatus {
    ProfilingStatus {
        level,
        slow_ms,
        sample_rate: None,
    }
}

pub fn database(name: &str, size_on_disk: f64, collections: u64) -> DatabaseSummary {
    DatabaseSummary {
        name: name.to_string(),
        size_on_disk,
        empty: false,
        stats: Some(DatabaseStats {
            collections,
            ..Default::default()
        }),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn collection(
    name: &str,
    count: u64,
    size: f64,
    storage_size: f64,
    avg_obj_size: f64,
    nindexes: u64,
    total_index_size: f64,
    capped: bool,
) -> CollectionInfo {
    CollectionInfo {
        name: name.to_string(),
        options: None,
        stats: Some(CollectionStats {
            ns: format!("marvels.{}", name),
            size,
            count,
            avg_obj_size,
            storage_size,
            capped,
            nindexes,
            total_index_size,
            index_sizes: vec![IndexSize {
                name: "_id_".to_string(),
                size: total_index_size,
            }],
        }),
    }
}

pub fn index(name: &str, ops: Option<u64>) -> IndexInfo {
    IndexInfo {
        name: name.to_string(),
        key: key_spec(name),
        accesses: ops.map(|ops| IndexAccess { ops, since: None }),
    }
}

fn key_spec(index_name: &str) -> serde_json::Value {
    let mut key = serde_json::Map::new();
    key.insert(index_name.trim_end_matches("_1").to_string(), json!(1));
    serde_json::Value::Object(key)
}

pub fn query(millis: u64, op: &str) -> ProfileQuery {
    ProfileQuery {
        op: Some(op.to_string()),
        ns: Some("marvels.avengers".to_string()),
        millis,
        command: Some(json!({ "find": "avengers" })),
        ..Default::default()
    }
}

fn server_fixture() -> ServerInfo {
    ServerInfo {
        host: "localhost".to_string(),
        version: "3.2.16".to_string(),
        uptime: 3600.0,
        connections: ServerConnections {
            current: 10,
            available: 90,
            total_created: 20,
        },
        storage_engine: Some(StorageEngine {
            name: "WiredTiger".to_string(),
            supports_committed_reads: true,
            persistent: true,
        }),
        databases: vec![database("local", 4096.0, 1), database("admin", 32768.0, 3)],
        profiling_status: Some(profiling_status(1, 100)),
    }
}

fn replication_fixture() -> ReplicationStatus {
    let member = |id: i64, name: &str, state: &str, health: &str| ReplicationMember {
        id,
        name: name.to_string(),
        ip: None,
        health: Some(ReplicationHealth {
            name: health.to_string(),
            value: None,
        }),
        state: Some(ReplicationState {
            name: state.to_string(),
            value: None,
        }),
        uptime: 3600,
        election_date: None,
    };

    ReplicationStatus {
        name: "rs0".to_string(),
        date: None,
        heartbeat_interval_millis: Some(2000),
        majority_vote_count: Some(2),
        write_majority_count: Some(2),
        term: Some(1),
        my_state: None,
        members: vec![
            member(0, "mongo1:27017", "PRIMARY", "UP"),
            member(1, "mongo2:27017", "SECONDARY", "UP"),
            member(2, "mongo3:27017", "SECONDARY", "DOWN"),
        ],
    }
}

fn server_description(host: &str, port: u16) -> ClusterServerDescription {
    ClusterServerDescription {
        address: ClusterServerAddress {
            host: host.to_string(),
            port,
        },
        election_id: None,
        state: Some("CONNECTED".to_string()),
        server_type: Some("REPLICA_SET_SECONDARY".to_string()),
        canonical_address: Some(format!("{}:{}", host, port)),
        hosts: Vec::new(),
        passives: Vec::new(),
        arbiters: Vec::new(),
        primary: None,
        round_trip_time_nanos: 1_000_000,
        max_document_size: 16_777_216,
    }
}

pub struct FakeState {
    pub server: ServerInfo,
    pub databases: Vec<DatabaseSummary>,
    pub collections: HashMap<String, Vec<CollectionInfo>>,
    pub indexes: HashMap<(String, String), Vec<IndexInfo>>,
    pub queries: Vec<ProfileQuery>,
    pub log: Vec<String>,
    pub parameters: Vec<ServerParameter>,
    pub operations: Vec<Operation>,
    pub replication: Result<ReplicationStatus, (u16, String)>,
    pub cluster: ClusterDescription,
    pub cluster_logs: ClusterLogs,
    pub cluster_parameters: ClusterParameters,
    pub database_profiling: HashMap<String, ProfilingStatus>,
    pub read_failure: Option<(u16, String)>,
    pub profiling_rejection: Option<(u16, String)>,
    pub server_profiling_updates: Vec<ProfilingStatus>,
    pub query_requests: Vec<SlowQueryRequest>,
    pub resets: Vec<String>,
    pub cluster_log_calls: usize,
}

impl Default for FakeState {
    fn default() -> Self {
        let mut collections = HashMap::new();
        collections.insert(
            "local".to_string(),
            vec![
                collection("avengers", 364_827, 4.03e8, 1.784e8, 1104.0, 8, 4.6e7, false),
                collection("movies", 178_157, 6.57e7, 1.86e7, 368.0, 2, 7_053_312.0, true),
            ],
        );

        let mut indexes = HashMap::new();
        indexes.insert(
            ("local".to_string(), "avengers".to_string()),
            vec![
                index("_id_", Some(120)),
                index("name_1", Some(0)),
                index("year_1", Some(5)),
                index("title_1", Some(5)),
            ],
        );

        let queries = (1..=45)
            .map(|i| query(i * 10, if i % 2 == 0 { "update" } else { "query" }))
            .collect();

        let parameters = vec![
            ServerParameter {
                name: "syncdelay".to_string(),
                value: json!(60),
            },
            ServerParameter {
                name: "authenticationMechanisms".to_string(),
                value: json!(["SCRAM-SHA-1"]),
            },
            ServerParameter {
                name: "logLevel".to_string(),
                value: json!(0),
            },
        ];

        let mut cluster_logs = BTreeMap::new();
        cluster_logs.insert(
            "mongo2:27017".to_string(),
            ServerLog { host: None, logs: vec!["b2".to_string(), "b1".to_string()] },
        );
        cluster_logs.insert(
            "mongo1:27017".to_string(),
            ServerLog { host: None, logs: vec!["a2".to_string(), "a1".to_string()] },
        );

        let mut cluster_parameters = BTreeMap::new();
        cluster_parameters.insert("mongo2:27017".to_string(), parameters.clone());
        cluster_parameters.insert("mongo1:27017".to_string(), parameters.clone());

        Self {
            server: server_fixture(),
            databases: vec![database("local", 4096.0, 1), database("admin", 32768.0, 3)],
            collections,
            indexes,
            queries,
            log: vec!["newest".to_string(), "oldest".to_string()],
            parameters,
            operations: Vec::new(),
            replication: Ok(replication_fixture()),
            cluster: ClusterDescription {
                connection_mode: Some("MULTIPLE".to_string()),
                cluster_type: Some("REPLICA_SET".to_string()),
                settings: None,
                server_descriptions: vec![
                    server_description("mongo2", 27017),
                    server_description("mongo1", 27018),
                    server_description("mongo1", 27017),
                ],
            },
            cluster_logs,
            cluster_parameters,
            database_profiling: HashMap::new(),
            read_failure: None,
            profiling_rejection: None,
            server_profiling_updates: Vec::new(),
            query_requests: Vec::new(),
            resets: Vec::new(),
            cluster_log_calls: 0,
        }
    }
}

/// Handle on the shared fake state.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Backend {
        let api = Arc::new(FakeApi {
            state: self.state.clone(),
        });
        Backend {
            server: api.clone(),
            databases: api.clone(),
            collections: api.clone(),
            cluster: api,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Makes every read fail until [`FakeBackend::heal`] is called.
    pub fn fail_reads(&self, status: u16, message: &str) {
        self.state().read_failure = Some((status, message.to_string()));
    }

    pub fn heal(&self) {
        self.state().read_failure = None;
    }

    pub fn reject_profiling_updates(&self, status: u16, message: &str) {
        self.state().profiling_rejection = Some((status, message.to_string()));
    }

    pub fn server_profiling_updates(&self) -> Vec<ProfilingStatus> {
        self.state().server_profiling_updates.clone()
    }

    pub fn query_requests(&self) -> Vec<SlowQueryRequest> {
        self.state().query_requests.clone()
    }
}

struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    fn read<T>(&self, f: impl FnOnce(&mut FakeState) -> AppResult<T>) -> AppResult<T> {
        let mut state = self.state.lock().unwrap();
        if let Some((status, message)) = &state.read_failure {
            return Err(backend_error(*status, message));
        }
        f(&mut state)
    }

    fn write(&self, status: &ProfilingStatus) -> AppResult<ProfilingStatus> {
        let state = self.state.lock().unwrap();
        match &state.profiling_rejection {
            Some((code, message)) => Err(backend_error(*code, message)),
            None => Ok(status.clone()),
        }
    }
}

#[async_trait]
impl ServerApi for FakeApi {
    async fn get(&self) -> AppResult<ServerInfo> {
        self.read(|s| Ok(s.server.clone()))
    }

    async fn log(&self) -> AppResult<Vec<String>> {
        self.read(|s| Ok(s.log.clone()))
    }

    async fn parameters(&self) -> AppResult<Vec<ServerParameter>> {
        self.read(|s| Ok(s.parameters.clone()))
    }

    async fn operations(&self) -> AppResult<Vec<Operation>> {
        self.read(|s| Ok(s.operations.clone()))
    }

    async fn replication(&self) -> AppResult<ReplicationStatus> {
        self.read(|s| {
            s.replication
                .clone()
                .map_err(|(status, message)| backend_error(status, &message))
        })
    }

    async fn update_profiling_status(
        &self,
        status: &ProfilingStatus,
    ) -> AppResult<ProfilingStatus> {
        let updated = self.write(status)?;
        self.state.lock().unwrap().server_profiling_updates.push(updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl DatabaseApi for FakeApi {
    async fn list(&self) -> AppResult<Vec<DatabaseSummary>> {
        self.read(|s| Ok(s.databases.clone()))
    }

    async fn get(&self, db: &str) -> AppResult<DatabaseSummary> {
        self.read(|s| {
            s.databases
                .iter()
                .find(|d| d.name == db)
                .cloned()
                .ok_or_else(|| backend_error(404, &format!("Database '{}' does not exist", db)))
        })
    }

    async fn profiling_queries(
        &self,
        _db: &str,
        request: &SlowQueryRequest,
    ) -> AppResult<Page<ProfileQuery>> {
        self.read(|s| {
            s.query_requests.push(request.clone());

            let mut queries: Vec<ProfileQuery> = s
                .queries
                .iter()
                .filter(|q| match request.filters.get("op") {
                    Some(op) if !op.is_empty() => q.op.as_deref() == Some(op.as_str()),
                    _ => true,
                })
                .cloned()
                .collect();
            queries.sort_by_key(|q| q.millis);
            if request.sort.order == SortOrder::Desc {
                queries.reverse();
            }

            let page_size = u64::from(request.page_size.unwrap_or(20));
            let total = queries.len() as u64;
            let results = queries
                .into_iter()
                .skip(((request.page - 1) * page_size) as usize)
                .take(page_size as usize)
                .collect();

            Ok(Page::new(
                results,
                PageInfo {
                    page: request.page,
                    page_size,
                    total,
                },
            ))
        })
    }

    async fn reset_profiling_queries(&self, db: &str) -> AppResult<()> {
        self.read(|s| {
            s.resets.push(db.to_string());
            s.queries.clear();
            Ok(())
        })
    }

    async fn profiling_status(&self, db: &str) -> AppResult<ProfilingStatus> {
        self.read(|s| {
            Ok(s.database_profiling
                .get(db)
                .cloned()
                .unwrap_or_else(|| profiling_status(0, 100)))
        })
    }

    async fn update_profiling_status(
        &self,
        db: &str,
        status: &ProfilingStatus,
    ) -> AppResult<ProfilingStatus> {
        let updated = self.write(status)?;
        self.state
            .lock()
            .unwrap()
            .database_profiling
            .insert(db.to_string(), updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl CollectionApi for FakeApi {
    async fn list(&self, db: &str) -> AppResult<Vec<CollectionInfo>> {
        self.read(|s| Ok(s.collections.get(db).cloned().unwrap_or_default()))
    }

    async fn indexes(&self, db: &str, collection: &str) -> AppResult<Vec<IndexInfo>> {
        self.read(|s| {
            Ok(s.indexes
                .get(&(db.to_string(), collection.to_string()))
                .cloned()
                .unwrap_or_default())
        })
    }
}

#[async_trait]
impl ClusterApi for FakeApi {
    async fn describe(&self) -> AppResult<ClusterDescription> {
        self.read(|s| Ok(s.cluster.clone()))
    }

    async fn logs(&self) -> AppResult<ClusterLogs> {
        self.read(|s| {
            s.cluster_log_calls += 1;
            Ok(s.cluster_logs.clone())
        })
    }

    async fn parameters(&self) -> AppResult<ClusterParameters> {
        self.read(|s| Ok(s.cluster_parameters.clone()))
    }
}
