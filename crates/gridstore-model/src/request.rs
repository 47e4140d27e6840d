//! Request payloads exchanged with the table UI layer.

use serde::{Deserialize, Serialize};

use crate::filter::FilterNode;
use crate::options::QueryOptions;

/// How a save mutation treats the submitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveMode {
    /// Insert new records.
    Add,
    /// Replace existing records matched by id.
    Update,
}

/// The HTTP-facing query payload; maps 1:1 onto the repository contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Paging and sorting options.
    #[serde(default)]
    pub options: QueryOptions,

    /// Optional filter tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,

    /// Whether to materialize a parent/child hierarchy.
    #[serde(default)]
    pub tree: bool,
}

impl QueryRequest {
    /// Create a flat query request.
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            filter: None,
            tree: false,
        }
    }

    /// Attach a filter tree.
    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Request tree materialization.
    pub fn with_tree(mut self) -> Self {
        self.tree = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PredicateKind;

    #[test]
    fn test_request_roundtrip() {
        let request = QueryRequest::new(QueryOptions::new(2, 10))
            .with_filter(FilterNode::value("Name", PredicateKind::Contains, "Zhang"))
            .with_tree();

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"tree\":true"));
        assert!(json.contains("\"pageIndex\":2"));

        let back: QueryRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_minimal_payload() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.options.page_index, 1);
        assert!(request.filter.is_none());
        assert!(!request.tree);
    }

    #[test]
    fn test_save_mode_names() {
        assert_eq!(serde_json::to_string(&SaveMode::Add).unwrap(), "\"Add\"");
        assert_eq!(
            serde_json::to_string(&SaveMode::Update).unwrap(),
            "\"Update\""
        );
    }
}
