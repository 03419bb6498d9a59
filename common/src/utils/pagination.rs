//! Page-number calculator.

use crate::errors::{AppError, AppResult};
use crate::models::PageInfo;

/// Page list derived from a total count and a page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    total: u64,
    page_size: u64,
    page: u64,
}

impl Pagination {
    /// Creates a calculator positioned on the first page.
    pub fn new(total: u64, page_size: u64) -> Self {
        Self {
            total,
            page_size,
            page: 1,
        }
    }

    /// Creates a calculator from the metadata of a fetched page.
    pub fn from_page(info: PageInfo) -> Self {
        Self {
            total: info.total,
            page_size: info.page_size,
            page: info.page.max(1),
        }
    }

    /// Number of pages; zero when there is nothing to page through.
    pub fn nb_pages(&self) -> u64 {
        if self.total == 0 || self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    /// Selectable page numbers, `1..=nb_pages`.
    pub fn pages(&self) -> Vec<u64> {
        (1..=self.nb_pages()).collect()
    }

    /// Current page.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Selects a page and returns the number to emit to the owner.
    pub fn select(&mut self, page: u64) -> AppResult<u64> {
        let nb_pages = self.nb_pages();
        if page == 0 || page > nb_pages {
            return Err(AppError::Validation(format!(
                "page {} is out of range 1..={}",
                page, nb_pages
            )));
        }
        self.page = page;
        Ok(page)
    }
}
