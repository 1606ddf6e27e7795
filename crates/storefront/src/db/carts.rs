//! Saved carts for signed-in shoppers.

use sqlx::PgPool;
use sqlx::types::Json;

use hearth_core::{CartItem, UserId};

use super::RepositoryError;
use crate::session::CartStore;

/// Cart persistence in the `saved_carts` table, one JSON document per user.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CartStore for PgCartStore {
    async fn load(&self, user: UserId) -> Result<Option<Vec<CartItem>>, RepositoryError> {
        let row: Option<(Json<Vec<CartItem>>,)> =
            sqlx::query_as("SELECT items FROM saved_carts WHERE user_id = $1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(items),)| items))
    }

    async fn save(&self, user: UserId, items: &[CartItem]) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO saved_carts (user_id, items, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(user)
        .bind(Json(items))
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;
        Ok(())
    }
}
