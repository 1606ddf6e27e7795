//! Order history route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use hearth_core::{Email, Order};

use crate::catalog::CatalogBackend;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    pub email: String,
}

/// Orders placed with an email, newest first.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the email is malformed.
pub async fn list<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<Json<Vec<Order>>> {
    let email =
        Email::parse(&query.email).map_err(|e| AppError::BadRequest(format!("email: {e}")))?;
    let orders = OrderRepository::new(state.pool()?)
        .list_for_email(&email)
        .await?;
    Ok(Json(orders))
}
