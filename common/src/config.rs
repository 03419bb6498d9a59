//! Application configuration.
//!
//! Every setting comes from the environment; missing variables fall back to
//! defaults suitable for a backend running on the same machine.

use std::time::Duration;

use crate::errors::{AppError, AppResult};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8081";

/// Runtime configuration for the dashboard.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the service, used in logs and response metadata.
    pub service_name: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Base URL of the REST backend, without trailing slash.
    pub backend_url: String,
    /// Optional request timeout. `None` keeps the transport default.
    pub backend_timeout_secs: Option<u64>,
    /// Optional page size sent with slow-query requests.
    pub slow_query_page_size: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "dashboard".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_timeout_secs: None,
            slow_query_page_size: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> AppResult<Self> {
        let defaults = Self::default();

        let port = match std::env::var("SERVER_PORT") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("invalid SERVER_PORT: {}", v)))?,
            Err(_) => defaults.port,
        };

        let backend_url = std::env::var("BACKEND_URL")
            .map(|v| normalize_base_url(&v))
            .unwrap_or(defaults.backend_url);
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "BACKEND_URL must be an http(s) URL: {}",
                backend_url
            )));
        }

        Ok(Self {
            service_name: defaults.service_name,
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port,
            backend_url,
            backend_timeout_secs: optional_number("BACKEND_TIMEOUT_SECS")?,
            slow_query_page_size: optional_number("SLOW_QUERY_PAGE_SIZE")?,
        })
    }

    /// Loads configuration and tags it with the given service name.
    pub fn load_with_service(service_name: &str) -> AppResult<Self> {
        let mut config = Self::load()?;
        config.service_name = service_name.to_string();
        Ok(config)
    }

    /// Creates a configuration pointing at the given backend, defaults elsewhere.
    pub fn with_backend_url(backend_url: &str) -> Self {
        Self {
            backend_url: normalize_base_url(backend_url),
            ..Default::default()
        }
    }

    /// Request timeout, when one is configured.
    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_secs.map(Duration::from_secs)
    }

    /// Address the webapp binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn optional_number<T: std::str::FromStr>(key: &str) -> AppResult<Option<T>> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("invalid {}: {}", key, v))),
        Err(_) => Ok(None),
    }
}
