//! Live product list with composable filters.

use std::sync::Arc;

use hearth_core::{FilterCriteria, Product};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use super::realtime::{Subscription, subscribe_to_table_changes};
use super::{CatalogBackend, CatalogError, LoadState, RequestSequence, Table, settled_state};

/// Point-in-time view of the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
    pub status: LoadState,
    pub products: Vec<Product>,
    /// Criteria that produced `products`; `None` for the unfiltered list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<FilterCriteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CatalogError>,
}

/// Holds one product collection, replaced wholesale by every fetch.
///
/// Filters never accumulate: the criteria passed to the most recent
/// [`filter`](Self::filter) alone determine the held list. A failed request
/// keeps the last good list and raises the error flag instead.
pub struct ProductCatalog<B> {
    inner: Arc<ProductCatalogInner<B>>,
}

struct ProductCatalogInner<B> {
    backend: Arc<B>,
    state: RwLock<CatalogState>,
    sequence: RequestSequence,
}

#[derive(Default)]
struct CatalogState {
    snapshot: ProductSnapshot,
    applied: u64,
    /// Criteria of the newest request, replayed on change notifications.
    requested: Option<FilterCriteria>,
}

impl<B> Clone for ProductCatalog<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CatalogBackend> ProductCatalog<B> {
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            inner: Arc::new(ProductCatalogInner {
                backend,
                state: RwLock::new(CatalogState::default()),
                sequence: RequestSequence::default(),
            }),
        }
    }

    /// Load every product, newest first.
    #[instrument(skip_all)]
    pub async fn fetch_all(&self) -> LoadState {
        self.load(None).await
    }

    /// Load the products matching `criteria`, replacing the held list.
    ///
    /// Empty criteria are the same as [`fetch_all`](Self::fetch_all).
    #[instrument(skip_all, fields(criteria = ?criteria))]
    pub async fn filter(&self, criteria: FilterCriteria) -> LoadState {
        if criteria.is_empty() {
            return self.load(None).await;
        }
        self.load(Some(criteria)).await
    }

    /// Repeat the newest request with the same criteria.
    pub async fn reload(&self) -> LoadState {
        let requested = self.inner.state.read().await.requested.clone();
        self.load(requested).await
    }

    async fn load(&self, criteria: Option<FilterCriteria>) -> LoadState {
        let ticket = {
            let mut state = self.inner.state.write().await;
            state.snapshot.status = LoadState::Loading;
            state.requested.clone_from(&criteria);
            self.inner.sequence.next()
        };

        let result = match &criteria {
            Some(criteria) => self.inner.backend.query_products(criteria).await,
            None => self.inner.backend.list_products().await,
        };

        let mut state = self.inner.state.write().await;
        if ticket < state.applied {
            debug!(ticket, applied = state.applied, "Discarding stale product response");
            return state.snapshot.status;
        }
        state.applied = ticket;
        let latest = self.inner.sequence.is_latest(ticket);

        match result {
            Ok(products) => {
                debug!(ticket, count = products.len(), "Product list loaded");
                state.snapshot.products = products;
                state.snapshot.criteria = criteria;
                state.snapshot.error = None;
                state.snapshot.status = settled_state(true, latest);
            }
            Err(e) => {
                error!(ticket, error = %e, "Failed to fetch products");
                // Last good list stays visible
                state.snapshot.error = Some(CatalogError::fetch_failed("products", &e));
                state.snapshot.status = settled_state(false, latest);
            }
        }

        state.snapshot.status
    }

    /// Reload whenever the products table changes, re-applying the newest
    /// criteria.
    #[must_use]
    pub fn watch(&self) -> Subscription {
        let catalog = self.clone();
        subscribe_to_table_changes(self.inner.backend.as_ref(), Table::Products, move || {
            let catalog = catalog.clone();
            async move {
                catalog.reload().await;
            }
        })
    }

    pub async fn snapshot(&self) -> ProductSnapshot {
        self.inner.state.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> LoadState {
        self.inner.state.read().await.snapshot.status
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.state.read().await.snapshot.products.clone()
    }
}
