//! Filter translation and evaluation.
//!
//! A [`FilterNode`] tree coming off the wire is compiled once per query
//! into a [`Predicate`], then evaluated against every candidate record.
//! Translation never fails: a node the compiler cannot make sense of
//! degrades to match-all and the degradation is logged, so a malformed
//! filter widens the result set instead of killing the query.

use std::cmp::Ordering;

use gridstore_model::{Combine, FieldKind, FilterNode, PredicateKind, Value};
use tracing::warn;

use crate::entity::{FieldAccess, FieldValue};

/// A compiled filter, ready to test records.
#[derive(Debug)]
pub struct Predicate {
    root: Node,
}

#[derive(Debug)]
enum Node {
    /// Matches every record. Produced for group nodes without their own
    /// comparison and for nodes that failed translation.
    Always,
    Compare {
        target: Target,
        op: PredicateKind,
        value: Value,
    },
    /// A node with children: the node's own test is the fold seed, and
    /// each child folds into the accumulator left to right with `combine`.
    Fold {
        head: Box<Node>,
        combine: Combine,
        children: Vec<Node>,
    },
}

#[derive(Debug)]
enum Target {
    /// Scalar field on the record itself.
    Field(String),
    /// Scalar field on a to-one reference.
    Reference { reference: String, field: String },
    /// Scalar field on the elements of a to-many collection.
    Elements { reference: String, field: String },
}

impl Predicate {
    /// Compile a filter tree. Infallible; untranslatable nodes match all.
    pub fn compile(node: &FilterNode) -> Self {
        Predicate {
            root: compile_node(node),
        }
    }

    /// Test a record against the compiled filter.
    pub fn matches(&self, row: &dyn FieldAccess) -> bool {
        eval(&self.root, row)
    }
}

fn compile_node(node: &FilterNode) -> Node {
    let head = compile_own(node);
    if node.children.is_empty() {
        return head;
    }
    Node::Fold {
        head: Box::new(head),
        combine: node.combine_with,
        children: node.children.iter().map(compile_node).collect(),
    }
}

/// Translate a node's own comparison, ignoring its children.
fn compile_own(node: &FilterNode) -> Node {
    let path = node.field_path().unwrap_or("");
    if path.is_empty() {
        // Group nodes carry children and no comparison of their own; only
        // a childless node with no field is worth flagging.
        if node.children.is_empty() {
            warn!(kind = ?node.field_kind, "filter node names no field; matching all records");
        }
        return Node::Always;
    }

    let target = match node.field_kind {
        FieldKind::Value => Target::Field(path.to_string()),
        FieldKind::Navigation | FieldKind::Collection => match split_path(path) {
            Some((reference, field)) => {
                if node.field_kind == FieldKind::Navigation {
                    Target::Reference { reference, field }
                } else {
                    Target::Elements { reference, field }
                }
            }
            None => {
                warn!(path, "navigation path is not `reference.field`; matching all records");
                return Node::Always;
            }
        },
    };

    match node.predicate_kind {
        PredicateKind::Contains | PredicateKind::NotContains => {
            if node.match_value.as_str().is_none() {
                warn!(
                    field = path,
                    value = ?node.match_value,
                    "substring match value is not a string; matching all records"
                );
                return Node::Always;
            }
        }
        PredicateKind::GreaterThan
        | PredicateKind::GreaterOrEqual
        | PredicateKind::LessThan
        | PredicateKind::LessOrEqual => {
            if !is_orderable(&node.match_value) {
                warn!(
                    field = path,
                    value = ?node.match_value,
                    "ordering match value is not comparable; matching all records"
                );
                return Node::Always;
            }
        }
        PredicateKind::Equal | PredicateKind::NotEqual => {}
    }

    Node::Compare {
        target,
        op: node.predicate_kind,
        value: node.match_value.clone(),
    }
}

/// Split a one-level dotted path into `(reference, field)`.
fn split_path(path: &str) -> Option<(String, String)> {
    let (reference, field) = path.split_once('.')?;
    if reference.is_empty() || field.is_empty() || field.contains('.') {
        return None;
    }
    Some((reference.to_string(), field.to_string()))
}

fn is_orderable(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_) | Value::String(_))
}

fn eval(node: &Node, row: &dyn FieldAccess) -> bool {
    match node {
        Node::Always => true,
        Node::Compare { target, op, value } => eval_compare(target, *op, value, row),
        Node::Fold {
            head,
            combine,
            children,
        } => {
            let mut acc = eval(head, row);
            for child in children {
                acc = match combine {
                    Combine::And => acc && eval(child, row),
                    Combine::Or => acc || eval(child, row),
                };
            }
            acc
        }
    }
}

fn eval_compare(target: &Target, op: PredicateKind, value: &Value, row: &dyn FieldAccess) -> bool {
    match target {
        Target::Field(name) => match row.field(name) {
            Some(FieldValue::Scalar(field)) => apply(op, &field, value),
            // Unknown or non-scalar fields never match, whatever the
            // operator.
            _ => false,
        },
        Target::Reference { reference, field } => match row.field(reference) {
            Some(FieldValue::Nav(Some(related))) => match related.field(field) {
                Some(FieldValue::Scalar(v)) => apply(op, &v, value),
                _ => false,
            },
            // Null references never match, even for negated operators.
            _ => false,
        },
        Target::Elements { reference, field } => match row.field(reference) {
            Some(FieldValue::Many(elements)) => {
                elements.iter().any(|element| match element.field(field) {
                    Some(FieldValue::Scalar(v)) => apply(op, &v, value),
                    _ => false,
                })
            }
            _ => false,
        },
    }
}

fn apply(op: PredicateKind, field: &Value, value: &Value) -> bool {
    match op {
        PredicateKind::Equal => field.loose_eq(value),
        PredicateKind::NotEqual => !field.loose_eq(value),
        PredicateKind::GreaterThan => field.partial_compare(value) == Some(Ordering::Greater),
        PredicateKind::GreaterOrEqual => matches!(
            field.partial_compare(value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        PredicateKind::LessThan => field.partial_compare(value) == Some(Ordering::Less),
        PredicateKind::LessOrEqual => matches!(
            field.partial_compare(value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        PredicateKind::Contains => match (field.as_str(), value.as_str()) {
            (Some(field), Some(value)) => field.contains(value),
            _ => false,
        },
        // Compilation guarantees the match value is a string; a record
        // field of another type trivially does not contain it.
        PredicateKind::NotContains => match (field.as_str(), value.as_str()) {
            (Some(field), Some(value)) => !field.contains(value),
            _ => true,
        },
    }
}
