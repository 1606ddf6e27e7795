//! Order management handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use hearth_core::{Order, OrderId, OrderStatus};

use crate::db::AdminOrderRepository;
use crate::error::Result;
use crate::state::AppState;

/// Body of `PUT /api/admin/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Every order with its lines, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(AdminOrderRepository::new(state.pool()).list().await?))
}

/// Change an order's status.
///
/// # Errors
///
/// Returns 404 for an unknown order and 409 if the order is already
/// delivered or cancelled.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = AdminOrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await?;
    Ok(Json(order))
}
