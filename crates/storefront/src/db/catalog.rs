//! `PostgreSQL` catalog backend.
//!
//! Reads categories and products with runtime-checked queries and relays
//! the `hearth_table_changes` notification channel onto a broadcast feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgListener;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use hearth_core::{
    Category, CategoryId, FilterCriteria, Price, Product, ProductId, Rating, Slug,
};

use super::RepositoryError;
use crate::catalog::{CatalogBackend, Table, TableChange};

/// Channel the table triggers publish on.
pub const CHANGE_CHANNEL: &str = "hearth_table_changes";

const CHANGE_FEED_CAPACITY: usize = 256;

const CATEGORY_QUERY: &str =
    "SELECT id, name, slug, parent_id FROM categories ORDER BY name ASC, id ASC";

const PRODUCT_COLUMNS: &str = "SELECT id, name, price, rating, image, images, description, \
     category_id, color, in_stock, created_at FROM products";

/// A `categories` row before validation.
#[derive(FromRow)]
pub struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    parent_id: Option<CategoryId>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug for category {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            parent_id: row.parent_id,
        })
    }
}

/// A `products` row before validation.
#[derive(FromRow)]
pub struct ProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
    rating: Decimal,
    image: String,
    images: Vec<String>,
    description: String,
    category_id: Option<CategoryId>,
    color: Option<String>,
    in_stock: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let rating = Rating::new(row.rating).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating for product {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            rating,
            image: row.image,
            images: row.images,
            description: row.description,
            category_id: row.category_id,
            color: row.color,
            in_stock: row.in_stock,
            created_at: row.created_at,
        })
    }
}

/// Convert fetched rows, failing on the first corrupt one.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` for an out-of-range price or rating.
pub fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Escape `LIKE` metacharacters so user input matches literally.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Append a `WHERE` clause for every present criterion.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, criteria: &FilterCriteria) {
    let mut separator = " WHERE ";

    if let Some(query) = criteria.text_query() {
        builder
            .push(separator)
            .push("name ILIKE ")
            .push_bind(format!("%{}%", escape_like(query)));
        separator = " AND ";
    }
    if let Some(category_id) = criteria.category_id {
        builder
            .push(separator)
            .push("category_id = ")
            .push_bind(category_id);
        separator = " AND ";
    }
    if let Some(min) = criteria.min_price {
        builder.push(separator).push("price >= ").push_bind(min.amount());
        separator = " AND ";
    }
    if let Some(max) = criteria.max_price {
        builder.push(separator).push("price <= ").push_bind(max.amount());
        separator = " AND ";
    }
    if let Some(color) = criteria.color_label() {
        builder
            .push(separator)
            .push("color = ")
            .push_bind(color.to_string());
        separator = " AND ";
    }
    if let Some(in_stock) = criteria.in_stock {
        builder.push(separator).push("in_stock = ").push_bind(in_stock);
    }
}

fn product_query(criteria: &FilterCriteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(PRODUCT_COLUMNS);
    push_filters(&mut builder, criteria);
    builder.push(" ORDER BY created_at DESC, id ASC");
    builder
}

/// Catalog reads against `PostgreSQL`.
pub struct PgCatalog {
    pool: PgPool,
    changes: broadcast::Sender<TableChange>,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { pool, changes }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start relaying table notifications onto the change feed.
    ///
    /// The listener reconnects on its own. After a reconnect every table is
    /// announced as changed, since notifications sent while disconnected
    /// are lost.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the initial `LISTEN` fails.
    pub async fn start_change_feed(&self) -> Result<JoinHandle<()>, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!(channel = CHANGE_CHANNEL, "Listening for table changes");

        let changes = self.changes.clone();
        Ok(tokio::spawn(async move {
            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => match Table::parse(notification.payload()) {
                        Some(table) => {
                            debug!(%table, "Table change notification");
                            let _ = changes.send(TableChange { table });
                        }
                        None => warn!(
                            payload = notification.payload(),
                            "Ignoring notification for unknown table"
                        ),
                    },
                    Ok(None) => {
                        warn!("Change listener reconnected, invalidating all tables");
                        for table in Table::ALL {
                            let _ = changes.send(TableChange { table });
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Change listener failed");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }))
    }
}

impl CatalogBackend for PgCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(CATEGORY_QUERY)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Category::try_from).collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = product_query(&FilterCriteria::default())
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        into_products(rows)
    }

    async fn query_products(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = product_query(criteria)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        into_products(rows)
    }

    fn changes(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
