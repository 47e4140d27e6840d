//! Tree query execution: paginate roots, then materialize descendants.
//!
//! Pagination, filtering, sorting, and `total_count` all apply to root
//! records only (those with no parent). Each root on the returned page
//! then brings its whole subtree along, flattened depth-first into
//! `items`. Traversal is defensive about bad data: a record id is never
//! materialized twice, and descent stops at a fixed depth, so reference
//! cycles and degenerate chains cannot hang a query.

use futures::future::BoxFuture;
use gridstore_model::{FilterNode, QueryOptions, ResultPage, Value};
use tracing::{error, warn};

use crate::engine::{paginate, QueryEngine};
use crate::entity::TreeEntity;
use crate::error::StoreError;
use crate::source::TreeSource;

/// Maximum number of descendant levels materialized below a root.
pub const MAX_TREE_DEPTH: usize = 10;

impl<'a, S: ?Sized> QueryEngine<'a, S> {
    /// Run a tree query with the default depth bound.
    pub async fn tree<R>(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<R>
    where
        R: TreeEntity,
        S: TreeSource<R>,
    {
        self.tree_with_depth(options, filter, MAX_TREE_DEPTH).await
    }

    /// Run a tree query, descending at most `max_depth` levels below each
    /// root.
    ///
    /// A failed child lookup degrades that root to a leaf (logged); the
    /// other roots on the page are unaffected. A failed root scan yields
    /// an empty page, like flat queries.
    pub async fn tree_with_depth<R>(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
        max_depth: usize,
    ) -> ResultPage<R>
    where
        R: TreeEntity,
        S: TreeSource<R>,
    {
        let rows = match self.source().scan().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(entity = R::NAME, error = %err, "scan failed; returning empty page");
                return ResultPage::empty();
            }
        };

        let roots: Vec<R> = rows.into_iter().filter(|r| r.parent_id().is_none()).collect();
        let page = paginate(roots, options, filter);
        if page.items.is_empty() {
            return page;
        }

        let mut items: Vec<R> = Vec::with_capacity(page.items.len());
        let mut seen: Vec<Value> = Vec::with_capacity(page.items.len());
        for root in page.items {
            let root_id = root.id();
            if already_seen(&seen, &root_id) {
                warn!(entity = R::NAME, id = ?root_id, "duplicate root id; skipping");
                continue;
            }
            seen.push(root_id.clone());
            items.push(root);

            let item_mark = items.len();
            let seen_mark = seen.len();
            if let Err(err) =
                collect_children(self.source(), &root_id, 1, max_depth, &mut items, &mut seen)
                    .await
            {
                warn!(
                    entity = R::NAME,
                    root = ?root_id,
                    error = %err,
                    "child lookup failed; keeping root without descendants"
                );
                items.truncate(item_mark);
                seen.truncate(seen_mark);
            }
        }

        ResultPage::new(page.total_count, items, page.is_sorted, page.is_filtered)
    }
}

/// Depth-first descendant collection.
///
/// Ids already materialized are skipped rather than revisited, which both
/// deduplicates and breaks reference cycles. Recursion is boxed because
/// the future type would otherwise be infinite.
fn collect_children<'a, R, S>(
    source: &'a S,
    parent: &'a Value,
    depth: usize,
    max_depth: usize,
    items: &'a mut Vec<R>,
    seen: &'a mut Vec<Value>,
) -> BoxFuture<'a, Result<(), StoreError>>
where
    R: TreeEntity,
    S: TreeSource<R> + ?Sized,
{
    Box::pin(async move {
        if depth > max_depth {
            warn!(
                entity = R::NAME,
                parent = ?parent,
                depth,
                "maximum tree depth reached; not descending further"
            );
            return Ok(());
        }
        let children = source.children_of(parent).await?;
        for child in children {
            let id = child.id();
            if already_seen(seen, &id) {
                continue;
            }
            seen.push(id.clone());
            items.push(child);
            collect_children(source, &id, depth + 1, max_depth, items, seen).await?;
        }
        Ok(())
    })
}

fn already_seen(seen: &[Value], id: &Value) -> bool {
    seen.iter().any(|existing| existing.loose_eq(id))
}
