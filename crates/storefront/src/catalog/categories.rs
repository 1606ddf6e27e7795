//! Live category tree.

use std::sync::Arc;

use hearth_core::{CategoryNode, build_category_tree};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use super::realtime::{Subscription, subscribe_to_table_changes};
use super::{CatalogBackend, CatalogError, LoadState, RequestSequence, Table, settled_state};

/// Point-in-time view of the category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub status: LoadState,
    pub categories: Vec<CategoryNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CatalogError>,
}

/// Fetches the flat category table and publishes it as a forest.
///
/// The tree is rebuilt from scratch on every [`refresh`](Self::refresh);
/// nothing is patched locally. A failed fetch discards the previous tree so
/// consumers never render a stale hierarchy.
///
/// Cheap to clone: clones share state.
pub struct CategoryTree<B> {
    inner: Arc<CategoryTreeInner<B>>,
}

struct CategoryTreeInner<B> {
    backend: Arc<B>,
    state: RwLock<TreeState>,
    sequence: RequestSequence,
}

#[derive(Default)]
struct TreeState {
    snapshot: CategorySnapshot,
    applied: u64,
}

impl<B> Clone for CategoryTree<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CatalogBackend> CategoryTree<B> {
    /// Create an idle tree. Nothing is fetched until [`refresh`](Self::refresh).
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            inner: Arc::new(CategoryTreeInner {
                backend,
                state: RwLock::new(TreeState::default()),
                sequence: RequestSequence::default(),
            }),
        }
    }

    /// Re-fetch every category and rebuild the forest.
    ///
    /// Call after any category mutation. Returns the resulting state; fetch
    /// errors are recorded in the snapshot rather than returned.
    #[instrument(skip_all, fields(ticket))]
    pub async fn refresh(&self) -> LoadState {
        // Ticket order must match the order of the Loading writes
        let ticket = {
            let mut state = self.inner.state.write().await;
            state.snapshot.status = LoadState::Loading;
            self.inner.sequence.next()
        };
        tracing::Span::current().record("ticket", ticket);

        let result = self.inner.backend.list_categories().await;

        let mut state = self.inner.state.write().await;
        if ticket < state.applied {
            debug!(applied = state.applied, "Discarding stale category response");
            return state.snapshot.status;
        }
        state.applied = ticket;
        let latest = self.inner.sequence.is_latest(ticket);

        match result {
            Ok(categories) => {
                let fetched = categories.len();
                let forest = build_category_tree(categories);
                for orphan in &forest.dropped {
                    debug!(
                        category_id = %orphan.id,
                        parent_id = ?orphan.parent_id,
                        "Dropping unreachable category from tree"
                    );
                }
                debug!(fetched, roots = forest.roots.len(), "Category tree rebuilt");
                state.snapshot.categories = forest.roots;
                state.snapshot.error = None;
                state.snapshot.status = settled_state(true, latest);
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch categories");
                state.snapshot.categories.clear();
                state.snapshot.error = Some(CatalogError::fetch_failed("categories", &e));
                state.snapshot.status = settled_state(false, latest);
            }
        }

        state.snapshot.status
    }

    /// Reload the tree whenever the categories table changes.
    ///
    /// The returned handle must be kept alive for as long as updates are
    /// wanted; dropping it stops the reloads.
    #[must_use]
    pub fn watch(&self) -> Subscription {
        let tree = self.clone();
        subscribe_to_table_changes(self.inner.backend.as_ref(), Table::Categories, move || {
            let tree = tree.clone();
            async move {
                tree.refresh().await;
            }
        })
    }

    pub async fn snapshot(&self) -> CategorySnapshot {
        self.inner.state.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> LoadState {
        self.inner.state.read().await.snapshot.status
    }

    /// Root categories with nested subcategories.
    pub async fn categories(&self) -> Vec<CategoryNode> {
        self.inner.state.read().await.snapshot.categories.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use hearth_core::{Category, CategoryId};

    use super::*;
    use crate::catalog::memory::InMemoryCatalog;

    fn id(n: u128) -> CategoryId {
        CategoryId::from_u128(n)
    }

    #[tokio::test]
    async fn test_idle_until_refreshed() {
        let tree = CategoryTree::new(Arc::new(InMemoryCatalog::new()));
        assert_eq!(tree.status().await, LoadState::Idle);
        assert!(tree.categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_builds_forest_and_drops_orphans() {
        let backend = Arc::new(InMemoryCatalog::new());
        backend.insert_category(Category::root(id(1), "Furniture"));
        backend.insert_category(Category::child(id(2), "Chairs", id(1)));
        backend.insert_category(Category::child(id(3), "Orphan", id(99)));

        let tree = CategoryTree::new(backend);
        assert_eq!(tree.refresh().await, LoadState::Ready);

        let roots = tree.categories().await;
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].category.name, "Furniture");
        assert_eq!(roots[0].subcategories[0].category.name, "Chairs");
        assert!(roots[0].find(id(3)).is_none());
    }

    #[tokio::test]
    async fn test_failure_discards_previous_tree() {
        let backend = Arc::new(InMemoryCatalog::new());
        backend.insert_category(Category::root(id(1), "Furniture"));
        let tree = CategoryTree::new(Arc::clone(&backend));
        tree.refresh().await;
        assert_eq!(tree.categories().await.len(), 1);

        backend.set_failing(true);
        assert_eq!(tree.refresh().await, LoadState::Errored);
        let snapshot = tree.snapshot().await;
        assert!(snapshot.categories.is_empty());
        assert!(matches!(
            snapshot.error,
            Some(CatalogError::FetchFailed {
                resource: "categories",
                ..
            })
        ));

        backend.set_failing(false);
        assert_eq!(tree.refresh().await, LoadState::Ready);
        assert!(tree.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let backend = Arc::new(InMemoryCatalog::new());
        backend.insert_category(Category::root(id(1), "Old"));
        backend.queue_delay(Duration::from_millis(200));

        let tree = CategoryTree::new(Arc::clone(&backend));
        let slow = tokio::spawn({
            let tree = tree.clone();
            async move { tree.refresh().await }
        });
        // Let the slow request take its ticket and start waiting
        tokio::time::sleep(Duration::from_millis(20)).await;

        backend.insert_category(Category::root(id(2), "New"));
        assert_eq!(tree.refresh().await, LoadState::Ready);
        slow.await.unwrap();

        let names: Vec<String> = tree
            .categories()
            .await
            .into_iter()
            .map(|n| n.category.name)
            .collect();
        assert_eq!(names, ["New", "Old"]);
        assert_eq!(tree.status().await, LoadState::Ready);
    }

    #[tokio::test]
    async fn test_ticket_waits_for_state_lock() {
        let tree = CategoryTree::new(Arc::new(InMemoryCatalog::new()));
        let guard = tree.inner.state.write().await;

        let pending = tokio::spawn({
            let tree = tree.clone();
            async move { tree.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(tree.inner.sequence.is_latest(0), "no ticket while locked out");

        drop(guard);
        assert_eq!(pending.await.unwrap(), LoadState::Ready);
        assert!(tree.inner.sequence.is_latest(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refreshes_settle_ready() {
        let backend = Arc::new(InMemoryCatalog::new());
        backend.insert_category(Category::root(id(1), "Furniture"));
        let tree = CategoryTree::new(backend);

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let tree = tree.clone();
                tokio::spawn(async move { tree.refresh().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(tree.status().await, LoadState::Ready);
        assert_eq!(tree.categories().await.len(), 1);
    }
}
