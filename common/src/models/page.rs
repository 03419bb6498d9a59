//! Server-side pagination envelope.
//!
//! Paginated endpoints return the records as the JSON body and the paging
//! metadata in the `X-Page`, `X-Page-Size` and `X-Total` response headers.

use serde::Serialize;
use utoipa::ToSchema;

/// Header carrying the 1-based page number.
pub const PAGE_HEADER: &str = "x-page";
/// Header carrying the page size.
pub const PAGE_SIZE_HEADER: &str = "x-page-size";
/// Header carrying the total number of records.
pub const TOTAL_HEADER: &str = "x-total";

/// Paging metadata of a [`Page`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

/// One page of records returned by a server-paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    /// Builds a page from its records and metadata.
    pub fn new(results: Vec<T>, info: PageInfo) -> Self {
        Self {
            results,
            page: info.page,
            page_size: info.page_size,
            total: info.total,
        }
    }

    /// Paging metadata of this page.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}
