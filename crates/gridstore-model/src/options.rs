//! Paging and sorting options.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort direction for an explicit sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
    /// No direction given; an explicit sort field sorts ascending.
    #[default]
    Unset,
}

/// Paging and sorting options, one per query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// 1-based page index.
    #[serde(default = "default_page_index")]
    pub page_index: u32,

    /// Number of rows per page, always at least 1.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Explicit sort field; when absent the engine picks a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,

    /// Direction for the explicit sort field.
    #[serde(default)]
    pub sort_direction: SortDirection,
}

fn default_page_index() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl QueryOptions {
    /// Create options for a page, clamping index and size to at least 1.
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size: page_size.max(1),
            sort_field: None,
            sort_direction: SortDirection::Unset,
        }
    }

    /// Options for the first page with the default page size.
    pub fn first_page() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }

    /// Set the sort field and direction.
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = direction;
        self
    }

    /// Number of rows to skip before the requested page.
    pub fn skip(&self) -> usize {
        (self.page_index.max(1) as usize - 1) * self.take()
    }

    /// Number of rows in the requested page.
    pub fn take(&self) -> usize {
        self.page_size.max(1) as usize
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::first_page()
    }
}
