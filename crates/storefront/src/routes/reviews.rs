//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use hearth_core::{Email, NewReview, ProductId, Review, UserId};

use crate::catalog::CatalogBackend;
use crate::db::{ReviewRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /api/products/{id}/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub user_id: UserId,
    pub email: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Reviews for a product, newest first.
///
/// # Errors
///
/// Returns an error if the review store is unavailable.
pub async fn list<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool()?)
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// Submit a review.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid email or rating, and a
/// conflict if the product does not exist.
pub async fn create<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let email =
        Email::parse(&body.email).map_err(|e| AppError::BadRequest(format!("email: {e}")))?;
    let review = NewReview {
        product_id,
        user_id: body.user_id,
        rating: body.rating,
        comment: body.comment,
    };
    review
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let pool = state.pool()?;
    UserRepository::new(pool).ensure(review.user_id, &email).await?;
    let created = ReviewRepository::new(pool).create(&review).await?;

    tracing::info!(review_id = %created.id, %product_id, rating = created.rating, "Review submitted");
    Ok((StatusCode::CREATED, Json(created)))
}
