//! Backend API clients.
//!
//! One trait per backend resource, each with a `reqwest` implementation.
//! Views depend on the traits through [`Backend`] so they can be driven by
//! any implementation.

pub mod cluster;
pub mod collection;
pub mod database;
pub mod server;

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::AppResult;

use crate::client::HttpClient;

pub use cluster::{ClusterApi, HttpClusterApi};
pub use collection::{CollectionApi, HttpCollectionApi};
pub use database::{DatabaseApi, HttpDatabaseApi, QuerySort, SlowQueryRequest};
pub use server::{HttpServerApi, ServerApi};

/// The set of API clients a view can call.
#[derive(Clone)]
pub struct Backend {
    pub server: Arc<dyn ServerApi>,
    pub databases: Arc<dyn DatabaseApi>,
    pub collections: Arc<dyn CollectionApi>,
    pub cluster: Arc<dyn ClusterApi>,
}

impl Backend {
    /// Creates HTTP clients for the configured backend.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::http(HttpClient::new(config)?))
    }

    /// Creates HTTP clients sharing one connection pool.
    pub fn http(client: HttpClient) -> Self {
        Self {
            server: Arc::new(HttpServerApi::new(client.clone())),
            databases: Arc::new(HttpDatabaseApi::new(client.clone())),
            collections: Arc::new(HttpCollectionApi::new(client.clone())),
            cluster: Arc::new(HttpClusterApi::new(client)),
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
