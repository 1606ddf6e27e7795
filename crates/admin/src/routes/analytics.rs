//! Analytics handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::{AdminOrderRepository, ProductRepository};
use crate::error::Result;
use crate::services::analytics::{AnalyticsSummary, summarize};
use crate::state::AppState;

/// Sales summary over every order.
///
/// # Errors
///
/// Returns an error if the orders or product count cannot be read.
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>> {
    let pool = state.pool();
    let order_repo = AdminOrderRepository::new(pool);
    let product_repo = ProductRepository::new(pool);
    let (orders, total_products) = tokio::try_join!(order_repo.list(), product_repo.count())?;
    Ok(Json(summarize(&orders, total_products)))
}
