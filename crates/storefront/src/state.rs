//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::catalog::{CatalogBackend, CategoryTree, ProductCatalog, Subscription};
use crate::db::PgCatalog;
use crate::error::AppError;

/// Application state shared across all handlers.
///
/// Owns the live category tree and the unfiltered product list, together
/// with the realtime subscriptions that keep them current. Cheaply
/// cloneable via `Arc`.
pub struct AppState<B = PgCatalog> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    backend: Arc<B>,
    categories: CategoryTree<B>,
    products: ProductCatalog<B>,
    /// Order, review, and cart persistence. Absent when serving from a
    /// non-SQL backend.
    pool: Option<PgPool>,
    /// Held so the live views keep reloading until the state is dropped.
    _subscriptions: [Subscription; 2],
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CatalogBackend> AppState<B> {
    /// Build the live catalog views, subscribe them to changes, and load
    /// them once.
    ///
    /// Load failures are recorded in the views and do not prevent startup.
    pub async fn new(backend: Arc<B>, pool: Option<PgPool>) -> Self {
        let categories = CategoryTree::new(Arc::clone(&backend));
        let products = ProductCatalog::new(Arc::clone(&backend));

        // Subscribe before loading so no change slips between the two
        let subscriptions = [categories.watch(), products.watch()];
        let category_state = categories.refresh().await;
        let product_state = products.fetch_all().await;
        info!(?category_state, ?product_state, "Live catalog initialized");

        Self {
            inner: Arc::new(AppStateInner {
                backend,
                categories,
                products,
                pool,
                _subscriptions: subscriptions,
            }),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.inner.backend
    }

    /// The live category tree.
    #[must_use]
    pub fn categories(&self) -> &CategoryTree<B> {
        &self.inner.categories
    }

    /// The live, unfiltered product list.
    #[must_use]
    pub fn products(&self) -> &ProductCatalog<B> {
        &self.inner.products
    }

    /// Get a reference to the database connection pool.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` when the state was built without one.
    pub fn pool(&self) -> Result<&PgPool, AppError> {
        self.inner
            .pool
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("order store is not configured".to_string()))
    }
}
