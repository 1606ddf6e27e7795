//! Live catalog: category tree and product list facades.
//!
//! # Architecture
//!
//! - [`CatalogBackend`] is the seam to the store. [`crate::db::PgCatalog`]
//!   talks to `PostgreSQL`; [`memory::InMemoryCatalog`] backs tests and demos.
//! - [`CategoryTree`] and [`ProductCatalog`] own one resource each. They
//!   issue a single backend request per call, hold the last result, and
//!   expose a [`LoadState`]. Errors stop at the facade: they are logged and
//!   recorded in the snapshot, never returned to the caller.
//! - [`realtime`] turns the backend's change feed into whole-table reloads.
//!
//! ```text
//! Idle -> Loading -> Ready
//!                 -> Errored
//! (every fetch, filter, or refresh re-enters Loading)
//! ```

pub mod categories;
pub mod memory;
pub mod products;
pub mod realtime;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use hearth_core::{Category, FilterCriteria, Product};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::db::RepositoryError;

pub use categories::{CategorySnapshot, CategoryTree};
pub use memory::InMemoryCatalog;
pub use products::{ProductCatalog, ProductSnapshot};
pub use realtime::{Subscription, subscribe_to_table_changes};

/// Tables that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Categories,
    Products,
    Orders,
    OrderItems,
    Reviews,
}

impl Table {
    pub const ALL: [Self; 5] = [
        Self::Categories,
        Self::Products,
        Self::Orders,
        Self::OrderItems,
        Self::Reviews,
    ];

    /// Table name as it appears in the store (and in notification payloads).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
            Self::Reviews => "reviews",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.as_str() == name)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Some row in `table` was inserted, updated, or deleted.
///
/// Deliberately carries no row data: consumers reload the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
}

/// Read access to the catalog store.
///
/// Ordering is part of the contract: categories come back by name
/// ascending, products by creation time descending (ties by id).
pub trait CatalogBackend: Send + Sync + 'static {
    /// Every category, ordered by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    /// Every product, newest first.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Products matching every present field of `criteria`, newest first.
    fn query_products(
        &self,
        criteria: &FilterCriteria,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// A new receiver on the store's change feed.
    fn changes(&self) -> broadcast::Receiver<TableChange>;

    /// Cheap connectivity check for readiness probes.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Where a facade is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The newest request succeeded.
    Ready,
    /// The newest request failed.
    Errored,
}

/// A read against the store failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("failed to fetch {resource}: {message}")]
    FetchFailed {
        resource: &'static str,
        message: String,
    },
}

impl CatalogError {
    pub(crate) fn fetch_failed(resource: &'static str, err: &RepositoryError) -> Self {
        Self::FetchFailed {
            resource,
            message: err.to_string(),
        }
    }
}

impl Serialize for CatalogError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Numbers requests so a slow, older response cannot overwrite a newer one.
#[derive(Debug, Default)]
pub(crate) struct RequestSequence {
    issued: AtomicU64,
}

impl RequestSequence {
    /// Take a ticket for a new request.
    pub(crate) fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is the most recently issued request.
    pub(crate) fn is_latest(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }
}

/// Outcome of a request, as applied to facade state.
pub(crate) const fn settled_state(succeeded: bool, latest: bool) -> LoadState {
    match (latest, succeeded) {
        // A newer request is still in flight
        (false, _) => LoadState::Loading,
        (true, true) => LoadState::Ready,
        (true, false) => LoadState::Errored,
    }
}
