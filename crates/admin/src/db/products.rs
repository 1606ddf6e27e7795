//! Product mutations.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::{CategoryId, Price, Product, ProductId, Rating};
use hearth_storefront::db::catalog::{ProductRow, into_products};

use super::{MutationError, RepositoryError, required};

const PRODUCT_FIELDS: &str = "id, name, price, rating, image, images, description, \
     category_id, color, in_stock, created_at";

const fn default_in_stock() -> bool {
    true
}

/// Submitted product fields, for both create and full update.
///
/// Amounts arrive as raw decimals so a negative price is reported as
/// invalid input rather than a malformed body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    /// Kept as stored when absent on update, zero on create.
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

#[derive(Debug)]
struct ValidProduct {
    name: String,
    price: Price,
    rating: Option<Rating>,
    image: String,
    images: Vec<String>,
    description: String,
    category_id: Option<CategoryId>,
    color: Option<String>,
    in_stock: bool,
}

impl ProductDraft {
    fn validate(&self) -> Result<ValidProduct, MutationError> {
        let price =
            Price::new(self.price).map_err(|e| MutationError::Invalid(format!("price: {e}")))?;
        let rating = self
            .rating
            .map(Rating::new)
            .transpose()
            .map_err(|e| MutationError::Invalid(format!("rating: {e}")))?;

        Ok(ValidProduct {
            name: required("name", &self.name)?,
            price,
            rating,
            image: self.image.trim().to_owned(),
            images: self
                .images
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .map(str::to_owned)
                .collect(),
            description: self.description.trim().to_owned(),
            category_id: self.category_id,
            color: self
                .color
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
            in_stock: self.in_stock,
        })
    }
}

/// Repository for product writes.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, MutationError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_FIELDS} FROM products ORDER BY created_at DESC, id ASC"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(into_products(rows)?)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<usize, MutationError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::from)?;

        usize::try_from(count).map_err(|e| {
            MutationError::Database(RepositoryError::DataCorruption(format!(
                "product count {count}: {e}"
            )))
        })
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::Invalid` for a blank name or out-of-range
    /// amount, and `MutationError::Conflict` for an unknown category.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, MutationError> {
        let valid = draft.validate()?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
             (name, price, rating, image, images, description, category_id, color, in_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_FIELDS}"
        ))
        .bind(&valid.name)
        .bind(valid.price)
        .bind(valid.rating.unwrap_or_default())
        .bind(&valid.image)
        .bind(&valid.images)
        .bind(&valid.description)
        .bind(valid.category_id)
        .bind(&valid.color)
        .bind(valid.in_stock)
        .fetch_one(self.pool)
        .await
        .map_err(MutationError::from_write)?;

        let product = Product::try_from(row)?;
        tracing::info!(product_id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    /// Replace a product's fields. `created_at` is kept.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::NotFound` for an unknown id.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, MutationError> {
        let valid = draft.validate()?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $2, price = $3, rating = COALESCE($4, rating), \
             image = $5, images = $6, description = $7, category_id = $8, color = $9, \
             in_stock = $10 \
             WHERE id = $1 RETURNING {PRODUCT_FIELDS}"
        ))
        .bind(id)
        .bind(&valid.name)
        .bind(valid.price)
        .bind(valid.rating)
        .bind(&valid.image)
        .bind(&valid.images)
        .bind(&valid.description)
        .bind(valid.category_id)
        .bind(&valid.color)
        .bind(valid.in_stock)
        .fetch_optional(self.pool)
        .await
        .map_err(MutationError::from_write)?
        .ok_or(MutationError::NotFound)?;

        let product = Product::try_from(row)?;
        tracing::info!(price = %product.price, in_stock = product.in_stock, "Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::NotFound` for an unknown id, and
    /// `MutationError::Conflict` when orders still reference the product.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), MutationError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(MutationError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(MutationError::NotFound);
        }
        tracing::info!("Product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn draft(price: &str) -> ProductDraft {
        ProductDraft {
            name: "Oak Chair".to_string(),
            price: Decimal::from_str(price).unwrap(),
            rating: None,
            image: String::new(),
            images: Vec::new(),
            description: String::new(),
            category_id: None,
            color: None,
            in_stock: true,
        }
    }

    #[test]
    fn test_negative_price_is_invalid() {
        assert!(matches!(
            draft("-0.01").validate(),
            Err(MutationError::Invalid(m)) if m.starts_with("price")
        ));
        assert_eq!(
            draft("0").validate().unwrap().price,
            Price::from_cents(0).unwrap()
        );
    }

    #[test]
    fn test_rating_out_of_range_is_invalid() {
        let mut product = draft("10");
        product.rating = Some(Decimal::from(6));
        assert!(matches!(product.validate(), Err(MutationError::Invalid(_))));
    }

    #[test]
    fn test_blank_fields_are_normalized() {
        let mut product = draft("25.00");
        product.color = Some("  ".to_string());
        product.images = vec![" ".to_string(), " https://img/1.jpg ".to_string()];
        let valid = product.validate().unwrap();
        assert_eq!(valid.color, None);
        assert_eq!(valid.images, ["https://img/1.jpg"]);
    }

    #[test]
    fn test_in_stock_defaults_to_true() {
        let product: ProductDraft =
            serde_json::from_str(r#"{"name": "Lamp", "price": "12.50"}"#).unwrap();
        assert!(product.in_stock);
        assert_eq!(product.category_id, None);
    }
}
