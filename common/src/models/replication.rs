//! Replica set models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `replSetGetStatus` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationStatus {
    /// Replica set name.
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub heartbeat_interval_millis: Option<u64>,
    #[serde(default)]
    pub majority_vote_count: Option<u32>,
    #[serde(default)]
    pub write_majority_count: Option<u32>,
    #[serde(default)]
    pub term: Option<u64>,
    #[serde(default)]
    pub my_state: Option<ReplicationState>,
    #[serde(default)]
    pub members: Vec<ReplicationMember>,
}

/// A replica set member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub health: Option<ReplicationHealth>,
    #[serde(default)]
    pub state: Option<ReplicationState>,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub election_date: Option<String>,
}

/// Member health as reported by the backend (`UP` / `DOWN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReplicationHealth {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Member state (`PRIMARY`, `SECONDARY`, `ARBITER`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReplicationState {
    pub name: String,
    #[serde(default)]
    pub value: Option<i32>,
}

impl ReplicationMember {
    /// Whether the member reported itself healthy.
    pub fn is_up(&self) -> bool {
        self.health
            .as_ref()
            .map(|h| h.name.eq_ignore_ascii_case("UP"))
            .unwrap_or(false)
    }
}
