//! Product reviews.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use hearth_core::{NewReview, ProductId, Review, ReviewId, UserId};

use super::RepositoryError;

#[derive(FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    user_email: Option<String>,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid rating {} on review {}",
                row.rating, row.id
            ))
        })?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            user_email: row.user_email,
            rating,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT r.id, r.product_id, r.user_id, u.email AS user_email,
                   r.rating, r.comment, r.created_at
            FROM reviews r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC, r.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Store a review. The rating must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product or user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let row: ReviewRow = sqlx::query_as(
            r"
            WITH inserted AS (
                INSERT INTO reviews (product_id, user_id, rating, comment)
                VALUES ($1, $2, $3, $4)
                RETURNING id, product_id, user_id, rating, comment, created_at
            )
            SELECT i.id, i.product_id, i.user_id, u.email AS user_email,
                   i.rating, i.comment, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            ",
        )
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        row.try_into()
    }
}
