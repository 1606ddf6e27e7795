//! Category mutations.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::{Category, CategoryId, Slug};
use hearth_storefront::db::catalog::CategoryRow;

use super::{MutationError, RepositoryError, required};

const CATEGORY_FIELDS: &str = "id, name, slug, parent_id";

/// Submitted category fields, for both create and full update.
///
/// A missing or blank slug is derived from the name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, PartialEq, Eq)]
struct ValidCategory {
    name: String,
    slug: Slug,
    parent_id: Option<CategoryId>,
}

impl CategoryDraft {
    fn validate(&self) -> Result<ValidCategory, MutationError> {
        let name = required("name", &self.name)?;
        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                Slug::parse(raw).map_err(|e| MutationError::Invalid(format!("slug: {e}")))?
            }
            None => Slug::from_name(&name),
        };
        Ok(ValidCategory {
            name,
            slug,
            parent_id: self.parent_id,
        })
    }
}

/// Repository for category writes.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories as flat rows, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored slug is invalid.
    pub async fn list(&self) -> Result<Vec<Category>, MutationError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_FIELDS} FROM categories ORDER BY name ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter()
            .map(|row| Category::try_from(row).map_err(MutationError::from))
            .collect()
    }

    /// Look a category up by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Category>, MutationError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_FIELDS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(Category::try_from).transpose().map_err(Into::into)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::Invalid` for a blank name or malformed slug,
    /// and `MutationError::Conflict` for a duplicate slug or unknown parent.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, MutationError> {
        let valid = draft.validate()?;

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (name, slug, parent_id) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_FIELDS}"
        ))
        .bind(&valid.name)
        .bind(&valid.slug)
        .bind(valid.parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(MutationError::from_write)?;

        let category = Category::try_from(row)?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Replace a category's name, slug and parent.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::NotFound` for an unknown id, and
    /// `MutationError::Invalid` if the new parent is the category itself or
    /// one of its descendants.
    #[instrument(skip_all, fields(category_id = %id))]
    pub async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, MutationError> {
        let valid = draft.validate()?;
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        if let Some(parent_id) = valid.parent_id {
            let would_cycle: bool = sqlx::query_scalar(
                r"
                WITH RECURSIVE subtree AS (
                    SELECT id FROM categories WHERE id = $1
                    UNION
                    SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
                )
                SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)
                ",
            )
            .bind(id)
            .bind(parent_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            if would_cycle {
                return Err(MutationError::Invalid(
                    "a category cannot be moved under itself or its subcategories".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories SET name = $2, slug = $3, parent_id = $4 WHERE id = $1 \
             RETURNING {CATEGORY_FIELDS}"
        ))
        .bind(id)
        .bind(&valid.name)
        .bind(&valid.slug)
        .bind(valid.parent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(MutationError::from_write)?
        .ok_or(MutationError::NotFound)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        let category = Category::try_from(row)?;
        tracing::info!(slug = %category.slug, "Category updated");
        Ok(category)
    }

    /// Delete a category and, through the cascade, its subcategories.
    ///
    /// Products in the removed categories become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::NotFound` for an unknown id.
    #[instrument(skip_all, fields(category_id = %id))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), MutationError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(MutationError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(MutationError::NotFound);
        }
        tracing::info!("Category deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_derived_from_name() {
        let draft = CategoryDraft {
            name: "  Living   Room ".to_string(),
            ..CategoryDraft::default()
        };
        let valid = draft.validate().unwrap();
        assert_eq!(valid.name, "Living   Room");
        assert_eq!(valid.slug.as_str(), "living-room");
    }

    #[test]
    fn test_blank_slug_is_derived() {
        let draft = CategoryDraft {
            name: "Chairs".to_string(),
            slug: Some("   ".to_string()),
            parent_id: Some(CategoryId::from_u128(1)),
        };
        let valid = draft.validate().unwrap();
        assert_eq!(valid.slug.as_str(), "chairs");
        assert_eq!(valid.parent_id, Some(CategoryId::from_u128(1)));
    }

    #[test]
    fn test_explicit_slug_must_be_valid() {
        let draft = CategoryDraft {
            name: "Chairs".to_string(),
            slug: Some("Dining Chairs".to_string()),
            parent_id: None,
        };
        assert!(matches!(draft.validate(), Err(MutationError::Invalid(_))));

        let draft = CategoryDraft {
            slug: Some("dining-chairs".to_string()),
            ..draft
        };
        assert_eq!(draft.validate().unwrap().slug.as_str(), "dining-chairs");
    }

    #[test]
    fn test_name_is_required() {
        assert!(matches!(
            CategoryDraft::default().validate(),
            Err(MutationError::Invalid(_))
        ));
    }
}
