//! Product management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use hearth_core::{Product, ProductId};

use crate::db::{ProductDraft, ProductRepository};
use crate::error::Result;
use crate::state::AppState;

/// Every product, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

/// Create a product.
///
/// # Errors
///
/// Returns 400 for invalid input and 409 for an unknown category.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductRepository::new(state.pool()).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product.
///
/// # Errors
///
/// Returns 404 for an unknown id and 400 for invalid input.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).update(id, &draft).await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// # Errors
///
/// Returns 404 for an unknown id and 409 while orders reference it.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
