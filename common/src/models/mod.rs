//! Models mirrored from the MongoHero backend JSON payloads.

pub mod cluster;
pub mod collection;
pub mod database;
pub mod page;
pub mod profiling;
pub mod replication;
pub mod server;

// Re-export commonly used types
pub use cluster::{
    ClusterDescription, ClusterLogs, ClusterParameters, ClusterServerAddress,
    ClusterServerDescription, ClusterSettings, HostMap,
};
pub use collection::{CollectionInfo, CollectionStats, IndexAccess, IndexInfo, IndexSize};
pub use database::{DatabaseStats, DatabaseSummary};
pub use page::{Page, PageInfo};
pub use profiling::{ProfileQuery, ProfilingStatus};
pub use replication::{ReplicationHealth, ReplicationMember, ReplicationState, ReplicationStatus};
pub use server::{
    Operation, ServerConnections, ServerInfo, ServerLog, ServerParameter, StorageEngine,
};
