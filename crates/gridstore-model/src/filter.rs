//! Composable filter tree for dynamic queries.
//!
//! A [`FilterNode`] is one predicate (or predicate group) in the filter
//! tree a table UI sends with each query. Nodes carry their own comparison
//! plus child nodes; children are folded into the parent's test using the
//! parent's [`Combine`] operator, left to right.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::Value;

/// Comparison operator applied by a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PredicateKind {
    /// Field equals the match value.
    #[default]
    Equal,
    /// Field does not equal the match value.
    NotEqual,
    /// Field is strictly greater than the match value.
    GreaterThan,
    /// Field is greater than or equal to the match value.
    GreaterOrEqual,
    /// Field is strictly less than the match value.
    LessThan,
    /// Field is less than or equal to the match value.
    LessOrEqual,
    /// String field contains the match value as a substring.
    Contains,
    /// String field does not contain the match value as a substring.
    NotContains,
}

/// Boolean operator used to fold child predicates into their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Combine {
    /// Logical conjunction.
    #[default]
    And,
    /// Logical disjunction.
    Or,
}

/// Which kind of field the node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldKind {
    /// A plain scalar field on the record, named by `valueField`.
    #[default]
    Value,
    /// A field reached through a single reference, named by
    /// `navigationField` as a dotted path (`"reference.subField"`).
    /// A record whose reference is null never matches.
    Navigation,
    /// A field on the elements of a collection, named by `navigationField`
    /// as a dotted path (`"collection.subField"`). Matches when at least
    /// one element matches (existential semantics).
    Collection,
}

/// One node of the recursive filter tree.
///
/// Exactly one of `value_field` / `navigation_field` is meaningful,
/// selected by `field_kind`. Children share the parent's `combine_with`
/// operator: each child's compiled test is folded against the accumulator
/// built so far, not against its siblings. Nodes are constructed by the
/// caller per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    /// Scalar field name, for `FieldKind::Value` nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,

    /// Dotted path, for `FieldKind::Navigation` / `FieldKind::Collection`
    /// nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_field: Option<String>,

    /// Value the field is compared against.
    #[serde(default)]
    pub match_value: Value,

    /// Comparison operator.
    #[serde(default)]
    pub predicate_kind: PredicateKind,

    /// Operator folding children into this node's own test.
    #[serde(default)]
    pub combine_with: Combine,

    /// Which field kind this node addresses.
    #[serde(default)]
    pub field_kind: FieldKind,

    /// Child predicates, folded left to right with `combine_with`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    /// Create a node comparing a scalar field.
    pub fn value(
        field: impl Into<String>,
        predicate: PredicateKind,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            value_field: Some(field.into()),
            predicate_kind: predicate,
            match_value: value.into(),
            ..Self::default()
        }
    }

    /// Create a node comparing a field reached through a reference.
    ///
    /// `path` is a one-level dotted path such as `"department.name"`.
    pub fn navigation(
        path: impl Into<String>,
        predicate: PredicateKind,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            navigation_field: Some(path.into()),
            predicate_kind: predicate,
            match_value: value.into(),
            field_kind: FieldKind::Navigation,
            ..Self::default()
        }
    }

    /// Create a node comparing a field on collection elements.
    ///
    /// `path` is a one-level dotted path such as `"roles.code"`.
    pub fn collection(
        path: impl Into<String>,
        predicate: PredicateKind,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            navigation_field: Some(path.into()),
            predicate_kind: predicate,
            match_value: value.into(),
            field_kind: FieldKind::Collection,
            ..Self::default()
        }
    }

    /// Create an equality comparison on a scalar field.
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::value(field, PredicateKind::Equal, value)
    }

    /// Create a substring comparison on a scalar string field.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::value(field, PredicateKind::Contains, value)
    }

    /// Set the operator used to fold children into this node.
    pub fn with_combine(mut self, combine: Combine) -> Self {
        self.combine_with = combine;
        self
    }

    /// Append a child predicate.
    pub fn with_child(mut self, child: FilterNode) -> Self {
        self.children.push(child);
        self
    }

    /// The field path this node addresses, according to its kind.
    pub fn field_path(&self) -> Option<&str> {
        match self.field_kind {
            FieldKind::Value => self.value_field.as_deref(),
            FieldKind::Navigation | FieldKind::Collection => self.navigation_field.as_deref(),
        }
    }

    /// Strict structural validation for callers that want to reject
    /// malformed trees with an error instead of the engine's fail-open
    /// degradation.
    pub fn validate(&self) -> Result<(), Error> {
        match self.field_kind {
            FieldKind::Value => {
                if self.value_field.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::MissingField("valueField"));
                }
            }
            FieldKind::Navigation | FieldKind::Collection => {
                let path = self.navigation_field.as_deref().unwrap_or("");
                let mut segments = path.split('.');
                let head = segments.next().unwrap_or("");
                let tail = segments.next().unwrap_or("");
                if head.is_empty() || tail.is_empty() || segments.next().is_some() {
                    return Err(Error::InvalidPath(path.to_string()));
                }
            }
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}
