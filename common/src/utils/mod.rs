//! Utility functions and helpers.

pub mod list;
pub mod pagination;
pub mod size;

// Re-export commonly used types
pub use list::{
    filter_by, sort_records, ListView, Named, SortField, SortOrder, SortState, SortValue,
};
pub use pagination::Pagination;
pub use size::{format_decimal, format_size};
