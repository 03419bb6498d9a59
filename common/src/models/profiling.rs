//! Profiling models: profiler settings and recorded slow operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Profiler configuration of a server or a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilingStatus {
    /// 0 = off, 1 = slow operations only, 2 = all operations.
    #[validate(range(min = 0, max = 2, message = "Level must be 0, 1 or 2"))]
    pub level: i32,
    /// Threshold in milliseconds above which an operation is slow.
    #[validate(range(min = 0, message = "Slow threshold cannot be negative"))]
    pub slow_ms: i64,
    /// Fraction of slow operations that get recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 1.0, message = "Sample rate must be between 0 and 1"))]
    pub sample_rate: Option<f64>,
}

/// One recorded slow operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub ns: Option<String>,
    /// Duration in milliseconds.
    #[serde(default)]
    pub millis: u64,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub keys_examined: u64,
    #[serde(default)]
    pub docs_examined: u64,
    #[serde(default)]
    pub has_sort_stage: bool,
    #[serde(default)]
    pub key_updates: u64,
    #[serde(default)]
    pub write_conflicts: u64,
    #[serde(default)]
    pub num_yield: u64,
    #[serde(default)]
    pub nreturned: u64,
    #[serde(default)]
    pub command: Option<serde_json::Value>,
    #[serde(default)]
    pub query: Option<serde_json::Value>,
    #[serde(default)]
    pub user: Option<String>,
}

impl ProfileQuery {
    /// Command text as displayed in the slow-query list.
    pub fn command_text(&self) -> String {
        self.command
            .as_ref()
            .or(self.query.as_ref())
            .map(|v| v.to_string())
            .unwrap_or_default()
    }
}
