//! Materialized query results.

use serde::{Deserialize, Serialize};

/// One page of query results.
///
/// `total_count` counts every record matching the filter before paging is
/// applied; in tree mode it counts root records only. A page is produced
/// once per query and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
    /// Matching records before pagination (roots only in tree mode).
    pub total_count: u64,

    /// Records in this page, flattened in tree mode.
    pub items: Vec<T>,

    /// Whether an explicit sort was applied.
    pub is_sorted: bool,

    /// Whether a filter restricted the result.
    pub is_filtered: bool,

    /// Whether a search-bar term was applied; set by the UI-facing layer,
    /// the engine itself leaves it false.
    pub is_searched: bool,
}

impl<T> ResultPage<T> {
    /// Create a page.
    pub fn new(total_count: u64, items: Vec<T>, is_sorted: bool, is_filtered: bool) -> Self {
        Self {
            total_count,
            items,
            is_sorted,
            is_filtered,
            is_searched: false,
        }
    }

    /// An empty, unfiltered page.
    pub fn empty() -> Self {
        Self::new(0, Vec::new(), false, false)
    }

    /// Mark whether a search term produced this page.
    pub fn with_searched(mut self, searched: bool) -> Self {
        self.is_searched = searched;
        self
    }

    /// Map the items into another type, preserving counts and flags.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultPage<U> {
        ResultPage {
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
            is_sorted: self.is_sorted,
            is_filtered: self.is_filtered,
            is_searched: self.is_searched,
        }
    }
}

impl<T> Default for ResultPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}
