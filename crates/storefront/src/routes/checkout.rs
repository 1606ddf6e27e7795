//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};

use hearth_core::Order;

use crate::catalog::CatalogBackend;
use crate::error::Result;
use crate::services::checkout::{self, CheckoutRequest};
use crate::state::AppState;

/// Place an order from the submitted cart lines.
///
/// # Errors
///
/// Returns a 400 for an invalid submission and a 409 if a line refers to a
/// product that no longer exists.
pub async fn place<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = checkout::place_order(state.pool()?, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
