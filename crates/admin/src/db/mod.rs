//! Catalog and order mutations for the admin panel.
//!
//! The admin shares the storefront database. Reads reuse the storefront
//! repositories; this module owns every write to `categories`, `products`
//! and `orders.status`.
//!
//! Each write fires the `hearth_table_changes` trigger, so running
//! storefronts reload their live catalog without a restart.

pub mod categories;
pub mod orders;
pub mod products;

use thiserror::Error;

pub use categories::{CategoryDraft, CategoryRepository};
pub use hearth_storefront::db::{RepositoryError, create_pool};
pub use orders::AdminOrderRepository;
pub use products::{ProductDraft, ProductRepository};

/// Errors returned by admin mutations.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The row to change does not exist.
    #[error("not found")]
    NotFound,

    /// The submitted values are rejected before or by the database.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The change collides with existing rows (duplicate slug, product
    /// referenced by orders).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed.
    #[error("database error: {0}")]
    Database(RepositoryError),
}

impl MutationError {
    /// Classify a failed write by the constraint it tripped.
    #[must_use]
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_check_violation()
        {
            return Self::Invalid(db_err.message().to_owned());
        }
        RepositoryError::from_write(err).into()
    }
}

impl From<RepositoryError> for MutationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

/// Trim a required text field.
pub(crate) fn required(field: &str, value: &str) -> Result<String, MutationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MutationError::Invalid(format!("{field} is required")));
    }
    Ok(value.to_owned())
}
