//! In-process catalog store.
//!
//! Behaves like the `PostgreSQL` store as far as the facades can tell: same
//! ordering, same filter rules, and every write announces itself on the
//! change feed. Used by tests and by local demos that have no database.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hearth_core::{Category, CategoryId, FilterCriteria, Product, ProductId, newest_first};
use tokio::sync::broadcast;

use super::{CatalogBackend, Table, TableChange};
use crate::db::RepositoryError;

const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Default)]
struct Store {
    categories: Vec<Category>,
    products: Vec<Product>,
    failing: bool,
    pending_delay: Option<Duration>,
}

pub struct InMemoryCatalog {
    store: Mutex<Store>,
    changes: broadcast::Sender<TableChange>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            store: Mutex::new(Store::default()),
            changes,
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a category, replacing any existing row with the same id.
    pub fn insert_category(&self, category: Category) {
        {
            let mut store = self.store();
            store.categories.retain(|c| c.id != category.id);
            store.categories.push(category);
        }
        self.notify(Table::Categories);
    }

    /// Delete a category and, like the foreign key, every descendant.
    /// Products in a deleted category become uncategorized.
    pub fn remove_category(&self, id: CategoryId) -> bool {
        let removed = {
            let mut store = self.store();
            let mut doomed = vec![id];
            let mut cursor = 0;
            while let Some(&parent) = doomed.get(cursor) {
                let children: Vec<CategoryId> = store
                    .categories
                    .iter()
                    .filter(|c| c.parent_id == Some(parent) && !doomed.contains(&c.id))
                    .map(|c| c.id)
                    .collect();
                doomed.extend(children);
                cursor += 1;
            }

            let before = store.categories.len();
            store.categories.retain(|c| !doomed.contains(&c.id));
            let removed = store.categories.len() < before;
            for product in &mut store.products {
                if product.category_id.is_some_and(|c| doomed.contains(&c)) {
                    product.category_id = None;
                }
            }
            removed
        };
        if removed {
            self.notify(Table::Categories);
            self.notify(Table::Products);
        }
        removed
    }

    /// Insert or replace a product by id.
    pub fn upsert_product(&self, product: Product) {
        {
            let mut store = self.store();
            store.products.retain(|p| p.id != product.id);
            store.products.push(product);
        }
        self.notify(Table::Products);
    }

    pub fn remove_product(&self, id: ProductId) -> bool {
        let removed = {
            let mut store = self.store();
            let before = store.products.len();
            store.products.retain(|p| p.id != id);
            store.products.len() < before
        };
        if removed {
            self.notify(Table::Products);
        }
        removed
    }

    /// Make every read fail until switched off again.
    pub fn set_failing(&self, failing: bool) {
        self.store().failing = failing;
    }

    /// Hold the next read's response for `delay`. The response reflects the
    /// data as it was when the read started.
    pub fn queue_delay(&self, delay: Duration) {
        self.store().pending_delay = Some(delay);
    }

    /// Announce a change to `table` on the feed.
    pub fn notify(&self, table: Table) {
        // No receivers is not an error: nobody is watching yet
        let _ = self.changes.send(TableChange { table });
    }

    /// Take a consistent read of the store, honoring failure and delay.
    async fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> Result<T, RepositoryError> {
        let (result, delay) = {
            let mut store = self.store();
            let delay = store.pending_delay.take();
            let result = if store.failing {
                Err(RepositoryError::Unavailable(
                    "in-memory catalog set to fail".to_string(),
                ))
            } else {
                Ok(f(&store))
            };
            (result, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

impl CatalogBackend for InMemoryCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.read(|store| {
            let mut categories = store.categories.clone();
            categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            categories
        })
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.read(|store| {
            let mut products = store.products.clone();
            products.sort_by(newest_first);
            products
        })
        .await
    }

    async fn query_products(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.read(|store| {
            let mut products: Vec<Product> = store
                .products
                .iter()
                .filter(|p| criteria.matches(p))
                .cloned()
                .collect();
            products.sort_by(newest_first);
            products
        })
        .await
    }

    fn changes(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read(|_| ()).await
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_core::Price;

    use super::fixtures::{ProductFixture, sample_product};
    use super::*;

    fn cat(n: u128) -> CategoryId {
        CategoryId::from_u128(n)
    }

    #[tokio::test]
    async fn test_categories_sorted_by_name() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_category(Category::root(cat(1), "Outdoor"));
        catalog.insert_category(Category::root(cat(2), "Bedroom"));

        let names: Vec<String> = catalog
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Bedroom", "Outdoor"]);
    }

    #[tokio::test]
    async fn test_remove_category_cascades() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_category(Category::root(cat(1), "Furniture"));
        catalog.insert_category(Category::child(cat(2), "Chairs", cat(1)));
        catalog.insert_category(Category::child(cat(3), "Stools", cat(2)));
        catalog.insert_category(Category::root(cat(4), "Lighting"));
        catalog.upsert_product(sample_product(1).in_category(cat(3)));

        assert!(catalog.remove_category(cat(1)));

        let remaining = catalog.list_categories().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.first().unwrap().id, cat(4));
        let product = catalog.list_products().await.unwrap().remove(0);
        assert_eq!(product.category_id, None);
    }

    #[tokio::test]
    async fn test_query_applies_every_present_field() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_product(sample_product(1).named("Brass Desk Lamp").with_price_cents(4500));
        catalog.upsert_product(sample_product(2).named("Floor LAMP").with_price_cents(12000));
        catalog.upsert_product(sample_product(3).named("Rug").with_price_cents(3000));

        let criteria = FilterCriteria::new()
            .with_query("lamp")
            .with_min_price(Price::from_cents(1000).unwrap())
            .with_max_price(Price::from_cents(5000).unwrap());
        let found = catalog.query_products(&criteria).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().name, "Brass Desk Lamp");
    }

    #[tokio::test]
    async fn test_writes_announce_changes() {
        let catalog = InMemoryCatalog::new();
        let mut feed = catalog.changes();

        catalog.upsert_product(sample_product(1));
        assert_eq!(feed.recv().await.unwrap().table, Table::Products);

        catalog.insert_category(Category::root(cat(1), "Bath"));
        assert_eq!(feed.recv().await.unwrap().table, Table::Categories);
    }

    #[tokio::test]
    async fn test_failing_and_ping() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.ping().await.is_ok());
        catalog.set_failing(true);
        assert!(matches!(
            catalog.list_products().await,
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
