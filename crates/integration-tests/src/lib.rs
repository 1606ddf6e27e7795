//! Integration tests for Hearth.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services needed)
//! cargo test -p hearth-integration-tests
//!
//! # Database tests, against a migrated database
//! DATABASE_URL=postgres://localhost/hearth_test \
//!     cargo test -p hearth-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_tree` / `product_filters` - live catalog facades over the in-memory store
//! - `storefront_routes` - storefront router driven with `tower::ServiceExt`
//! - `admin_database` - admin repositories and the change feed against `PostgreSQL`
//! - `storefront_database` - saved carts against `PostgreSQL`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use hearth_core::{Category, CategoryId, Price, Product, ProductId, Rating};
use hearth_storefront::catalog::InMemoryCatalog;
use hearth_storefront::state::AppState;

/// How long [`eventually`] waits before giving up.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

#[must_use]
pub const fn category_id(n: u128) -> CategoryId {
    CategoryId::from_u128(n)
}

/// A category with a fixed id and a slug derived from its name.
#[must_use]
pub fn category(n: u128, name: &str, parent: Option<u128>) -> Category {
    match parent {
        Some(parent) => Category::child(category_id(n), name, category_id(parent)),
        None => Category::root(category_id(n), name),
    }
}

/// An in-stock product priced in cents. Higher `n` means newer.
#[must_use]
pub fn product(n: u128, name: &str, cents: i64) -> Product {
    let minutes = i64::try_from(n).unwrap_or_default();
    Product {
        id: ProductId::from_u128(n),
        name: name.to_string(),
        price: Price::from_cents(cents).unwrap_or(Price::ZERO),
        rating: Rating::default(),
        image: String::new(),
        images: Vec::new(),
        description: String::new(),
        category_id: None,
        color: None,
        in_stock: true,
        created_at: DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::minutes(minutes),
    }
}

/// Builder-style tweaks for [`product`].
pub trait ProductExt {
    #[must_use]
    fn in_category(self, n: u128) -> Self;
    #[must_use]
    fn colored(self, color: &str) -> Self;
    #[must_use]
    fn sold_out(self) -> Self;
}

impl ProductExt for Product {
    fn in_category(mut self, n: u128) -> Self {
        self.category_id = Some(category_id(n));
        self
    }

    fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    fn sold_out(mut self) -> Self {
        self.in_stock = false;
        self
    }
}

/// A small furniture catalog: a tree three levels deep plus products in
/// several categories, colors, and stock states.
#[must_use]
pub fn furniture_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    for c in [
        category(1, "Furniture", None),
        category(2, "Chairs", Some(1)),
        category(3, "Armchairs", Some(2)),
        category(4, "Lighting", None),
    ] {
        catalog.insert_category(c);
    }
    for p in [
        product(1, "Oak Chair", 12_900).in_category(2).colored("oak"),
        product(2, "Velvet Armchair", 34_900).in_category(3).colored("green"),
        product(3, "Arc Lamp", 18_950).in_category(4).colored("black"),
        product(4, "Desk Lamp", 4_500)
            .in_category(4)
            .colored("brass")
            .sold_out(),
        product(5, "Gift Card", 2_500),
    ] {
        catalog.upsert_product(p);
    }
    catalog
}

/// Storefront state over an in-memory catalog, with no SQL pool.
pub async fn storefront_state(
    catalog: InMemoryCatalog,
) -> (Arc<InMemoryCatalog>, AppState<InMemoryCatalog>) {
    let backend = Arc::new(catalog);
    let state = AppState::new(Arc::clone(&backend), None).await;
    (backend, state)
}

/// Poll `check` until it returns true or [`SETTLE_TIMEOUT`] passes.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// `DATABASE_URL` for the ignored database tests.
#[must_use]
pub fn database_url() -> Option<SecretString> {
    std::env::var("DATABASE_URL").ok().map(SecretString::from)
}
