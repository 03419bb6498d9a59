//! Slow-query page of a database.
//!
//! Sorting, filtering and paging happen on the backend: every change issues
//! a new request and the returned page replaces the stored one.

use std::collections::BTreeMap;

use tracing::info;

use common::errors::{AppError, AppResult};
use common::models::{Page, ProfileQuery};
use common::utils::{Pagination, SortOrder};

use crate::api::{Backend, QuerySort, SlowQueryRequest};

use super::sequence::{Loadable, RequestTicket};

/// Slow-query list view-model.
pub struct SlowQueryView {
    backend: Backend,
    db: String,
    request: SlowQueryRequest,
    queries: Loadable<Page<ProfileQuery>>,
}

impl SlowQueryView {
    /// Starts on page 1, slowest first.
    pub fn new(backend: Backend, db: impl Into<String>) -> Self {
        Self::with_request(backend, db, SlowQueryRequest::default())
    }

    /// Starts from an explicit request state.
    pub fn with_request(
        backend: Backend,
        db: impl Into<String>,
        request: SlowQueryRequest,
    ) -> Self {
        Self {
            backend,
            db: db.into(),
            request: SlowQueryRequest {
                page: request.page.max(1),
                ..request
            },
            queries: Loadable::new(),
        }
    }

    pub fn database(&self) -> &str {
        &self.db
    }

    /// Parameters of the next fetch.
    pub fn request(&self) -> &SlowQueryRequest {
        &self.request
    }

    pub fn sort(&self) -> &QuerySort {
        &self.request.sort
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.request.filters
    }

    /// Fetches the current page.
    pub async fn load(&mut self) {
        let (ticket, request) = self.begin_fetch();
        let result = self.backend.databases.profiling_queries(&self.db, &request).await;
        self.apply_fetch(ticket, result);
    }

    /// Starts a fetch for the current parameters.
    ///
    /// Pair with [`SlowQueryView::apply_fetch`] when the request runs outside
    /// the view; only the latest started fetch is applied.
    pub fn begin_fetch(&mut self) -> (RequestTicket, SlowQueryRequest) {
        (self.queries.begin(), self.request.clone())
    }

    /// Applies a fetch result; returns `false` when it was superseded.
    pub fn apply_fetch(
        &mut self,
        ticket: RequestTicket,
        result: AppResult<Page<ProfileQuery>>,
    ) -> bool {
        let applied = self.queries.apply(ticket, result);
        if applied {
            if let Some(page) = self.queries.value() {
                info!(db = %self.db, page = page.page, total = page.total, "slow queries loaded");
            }
        }
        applied
    }

    /// Sorts on `field`: the current field toggles, another one sorts ascending.
    pub async fn sort_by(&mut self, field: &str) -> AppResult<()> {
        let field = field.trim();
        if field.is_empty() {
            return Err(AppError::Validation("sort field cannot be empty".to_string()));
        }

        let sort = &mut self.request.sort;
        if sort.field == field {
            sort.order = sort.order.toggle();
        } else {
            *sort = QuerySort::new(field, SortOrder::Asc);
        }
        self.request.page = 1;
        self.load().await;
        Ok(())
    }

    /// Sets a filter; an empty value removes it.
    pub async fn set_filter(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.request.filters.remove(key);
        } else {
            self.request.filters.insert(key.to_string(), value.to_string());
        }
        self.request.page = 1;
        self.load().await;
    }

    /// Moves to another page of the last fetched result.
    pub async fn select_page(&mut self, page: u64) -> AppResult<()> {
        let page = self.pagination().select(page)?;
        self.request.page = page;
        self.load().await;
        Ok(())
    }

    /// Clears recorded queries, then fetches page 1.
    ///
    /// When the backend refuses the reset the stored page is kept and the
    /// error is returned to the caller.
    pub async fn reset(&mut self) -> AppResult<()> {
        self.backend.databases.reset_profiling_queries(&self.db).await?;

        info!(db = %self.db, "slow queries reset");
        self.request.page = 1;
        self.load().await;
        Ok(())
    }

    /// Last fetched page, absent until the first successful response.
    pub fn page(&self) -> Option<&Page<ProfileQuery>> {
        self.queries.value()
    }

    pub fn pagination(&self) -> Pagination {
        self.queries
            .value()
            .map(|p| Pagination::from_page(p.info()))
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<String> {
        self.queries.error_message()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.queries.error()
    }

    pub fn is_loading(&self) -> bool {
        self.queries.is_loading()
    }

    /// Opens the detail navigator on the `index`-th query of the page.
    pub fn open_query(&self, index: usize) -> AppResult<QueryNavigator> {
        let queries = self
            .page()
            .map(|p| p.results.clone())
            .unwrap_or_default();
        QueryNavigator::new(queries, index)
    }
}

/// Steps through the queries of one page.
#[derive(Debug, Clone)]
pub struct QueryNavigator {
    queries: Vec<ProfileQuery>,
    index: usize,
}

impl QueryNavigator {
    pub fn new(queries: Vec<ProfileQuery>, index: usize) -> AppResult<Self> {
        if index >= queries.len() {
            return Err(AppError::NotFound(format!("no query at position {}", index)));
        }
        Ok(Self { queries, index })
    }

    pub fn current(&self) -> &ProfileQuery {
        &self.queries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.queries.len()
    }

    /// Moves forward, staying on the last query at the end.
    pub fn next(&mut self) -> &ProfileQuery {
        self.index = (self.index + 1).min(self.queries.len() - 1);
        self.current()
    }

    /// Moves back, staying on the first query at the start.
    pub fn previous(&mut self) -> &ProfileQuery {
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}
