//! View-models.
//!
//! Each view fetches through [`crate::api::Backend`], keeps the last good
//! snapshot and the last error, and recomputes its sorted, filtered or
//! paginated projection locally.

pub mod dashboard;
pub mod database;
pub mod indexes;
pub mod profiling;
pub mod sequence;
pub mod server;
pub mod slow_queries;

pub use dashboard::{DashboardView, DatabaseRow};
pub use database::{CollectionListView, CollectionRow, DatabaseView};
pub use indexes::{AlertLevel, IndexListView, IndexRow};
pub use profiling::{DialogOutcome, ProfilingScope, ProfilingStatusDialog};
pub use sequence::{Loadable, RequestSequence, RequestTicket};
pub use server::{
    ClusterView, MemberRow, ParameterRow, ServerLogView, ServerOperationsView,
    ServerParametersView, ServerReplicationView,
};
pub use slow_queries::{QueryNavigator, SlowQueryView};
