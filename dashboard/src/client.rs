//! Thin JSON client over `reqwest`.
//!
//! Every call performs exactly one request. Non-2xx responses become
//! [`AppError::Backend`] carrying the decoded error payload when the backend
//! sent one.

use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use common::config::AppConfig;
use common::errors::{AppError, AppResult, ErrorBody};
use common::models::page::{PAGE_HEADER, PAGE_SIZE_HEADER, TOTAL_HEADER};
use common::models::{Page, PageInfo};

/// HTTP client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Creates a client for the configured backend.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.backend_url).map_err(|e| {
            AppError::Config(format!("invalid BACKEND_URL {}: {}", config.backend_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "BACKEND_URL cannot be used as a base: {}",
                config.backend_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.backend_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Builds an endpoint URL; each segment is percent-encoded.
    pub fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("invalid backend base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET` returning a decoded JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let url = self.url(segments)?;
        let response = self.execute(self.http.get(url)).await?;
        decode(response).await
    }

    /// `GET` on a paginated endpoint.
    ///
    /// Records come from the body, metadata from the `X-Page`, `X-Page-Size`
    /// and `X-Total` headers. A missing header falls back to `requested_page`
    /// for the page number and to zero for the others.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        requested_page: u64,
    ) -> AppResult<Page<T>> {
        let url = self.url(segments)?;
        let response = self.execute(self.http.get(url).query(query)).await?;

        let headers = response.headers();
        let info = PageInfo {
            page: header_number(headers, PAGE_HEADER).unwrap_or(requested_page),
            page_size: header_number(headers, PAGE_SIZE_HEADER).unwrap_or(0),
            total: header_number(headers, TOTAL_HEADER).unwrap_or(0),
        };

        let results: Vec<T> = decode(response).await?;
        Ok(Page::new(results, info))
    }

    /// `PUT` with a JSON body, returning the decoded JSON response.
    pub async fn put_json<B, T>(&self, segments: &[&str], body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let response = self.execute(self.http.put(url).json(body)).await?;
        decode(response).await
    }

    /// `DELETE`, ignoring any response body.
    pub async fn delete(&self, segments: &[&str]) -> AppResult<()> {
        let url = self.url(segments)?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> AppResult<Response> {
        let request = request
            .build()
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "backend request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "backend unreachable");
            AppError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The payload is optional; an unreadable one is treated as absent.
        let body = response
            .bytes()
            .await
            .ok()
            .filter(|bytes| !bytes.is_empty())
            .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok());

        warn!(
            %method,
            %url,
            status = status.as_u16(),
            message = body.as_ref().map(|b| b.message.as_str()).unwrap_or(""),
            "backend request failed"
        );

        Err(AppError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::InvalidResponse(e.to_string()))
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
