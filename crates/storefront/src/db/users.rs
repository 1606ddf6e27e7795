//! Shopper profile rows.
//!
//! Identity lives with the auth provider; the store only keeps the id and
//! email it hands us so carts and reviews have something to reference.

use sqlx::PgPool;

use hearth_core::{Email, UserId};

use super::RepositoryError;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Make sure a profile row exists for `id`, recording its latest email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another user already has the email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn ensure(&self, id: UserId, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
            ",
        )
        .bind(id)
        .bind(email.as_str())
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;
        Ok(())
    }
}
