//! Flat query execution: scan, filter, count, sort, paginate.

use gridstore_model::{FilterNode, QueryOptions, ResultPage, SortDirection, Value};
use tracing::error;

use crate::entity::{Entity, FieldValue};
use crate::predicate::Predicate;
use crate::source::RecordSource;

/// Executes queries against a record source.
///
/// The engine is a thin borrow over a source; construct one per query.
pub struct QueryEngine<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: ?Sized> QueryEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub(crate) fn source(&self) -> &'a S {
        self.source
    }

    /// Run a flat paginated query.
    ///
    /// `total_count` reflects every record matching the filter, not just
    /// the page returned. A source failure is logged and yields an empty
    /// page; callers never see the error.
    pub async fn flat<R>(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<R>
    where
        R: Entity,
        S: RecordSource<R>,
    {
        match self.source.scan().await {
            Ok(rows) => paginate(rows, options, filter),
            Err(err) => {
                error!(entity = R::NAME, error = %err, "scan failed; returning empty page");
                ResultPage::empty()
            }
        }
    }
}

/// Filter, count, sort, and page a materialized candidate set.
///
/// Shared by flat queries (over all records) and tree queries (over root
/// records only).
pub(crate) fn paginate<R: Entity>(
    rows: Vec<R>,
    options: &QueryOptions,
    filter: Option<&FilterNode>,
) -> ResultPage<R> {
    let is_filtered = filter.is_some();
    let mut matching: Vec<R> = match filter {
        Some(node) => {
            let predicate = Predicate::compile(node);
            rows.into_iter()
                .filter(|row| predicate.matches(row))
                .collect()
        }
        None => rows,
    };

    let total_count = matching.len() as u64;
    if total_count == 0 {
        return ResultPage::new(0, Vec::new(), false, is_filtered);
    }

    let is_sorted = sort_rows(&mut matching, options);
    let items = apply_paging(matching, options);
    ResultPage::new(total_count, items, is_sorted, is_filtered)
}

/// Sort rows in place. Returns whether an explicit sort was applied.
///
/// Without an explicit sort field the order is still deterministic:
/// newest-first by the entity's creation field when it has one, ascending
/// id otherwise.
fn sort_rows<R: Entity>(rows: &mut [R], options: &QueryOptions) -> bool {
    match options.sort_field.as_deref() {
        Some(field) if !field.is_empty() => {
            let descending = options.sort_direction == SortDirection::Desc;
            rows.sort_by(|a, b| {
                let ordering = scalar_field(a, field).compare_for_sort(&scalar_field(b, field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
            true
        }
        _ => {
            match R::created_field() {
                Some(field) => rows.sort_by(|a, b| {
                    scalar_field(a, field)
                        .compare_for_sort(&scalar_field(b, field))
                        .reverse()
                }),
                None => rows.sort_by(|a, b| a.id().compare_for_sort(&b.id())),
            }
            false
        }
    }
}

fn apply_paging<R>(rows: Vec<R>, options: &QueryOptions) -> Vec<R> {
    rows.into_iter()
        .skip(options.skip())
        .take(options.take())
        .collect()
}

/// Read a scalar field for sorting; missing fields sort as null.
fn scalar_field<R: Entity>(row: &R, field: &str) -> Value {
    match row.field(field) {
        Some(FieldValue::Scalar(value)) => value,
        _ => Value::Null,
    }
}
