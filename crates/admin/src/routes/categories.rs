//! Category management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use hearth_core::{Category, CategoryId};

use crate::db::{CategoryDraft, CategoryRepository};
use crate::error::Result;
use crate::state::AppState;

/// Every category as a flat list.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// Create a category.
///
/// # Errors
///
/// Returns 400 for invalid input and 409 for a duplicate slug.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = CategoryRepository::new(state.pool()).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category.
///
/// # Errors
///
/// Returns 404 for an unknown id and 400 if the move would create a cycle.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .update(id, &draft)
        .await?;
    Ok(Json(category))
}

/// Delete a category together with its subcategories.
///
/// # Errors
///
/// Returns 404 for an unknown id.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
