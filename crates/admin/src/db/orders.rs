//! Order management.

use sqlx::PgPool;
use tracing::instrument;

use hearth_core::{Order, OrderId, OrderStatus};
use hearth_storefront::db::OrderRepository;

use super::{MutationError, RepositoryError};

/// Delivered and cancelled orders are final.
fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), MutationError> {
    if from.is_terminal() && from != to {
        return Err(MutationError::Conflict(format!(
            "order is {} and can no longer change",
            from.as_str()
        )));
    }
    Ok(())
}

/// Repository for order administration.
pub struct AdminOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminOrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order with its lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, MutationError> {
        Ok(OrderRepository::new(self.pool).list_all().await?)
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::NotFound` for an unknown order, and
    /// `MutationError::Conflict` when the order is already delivered or
    /// cancelled.
    #[instrument(skip_all, fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, MutationError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(RepositoryError::from)?
                .ok_or(MutationError::NotFound)?;

        check_transition(current, status)?;

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await
            .map_err(MutationError::from_write)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(from = %current, "Order status updated");

        OrderRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(MutationError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_orders_move_freely() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Shipped).is_ok());
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Processing).is_ok());
        assert!(check_transition(OrderStatus::Processing, OrderStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_final_orders_are_locked() {
        assert!(matches!(
            check_transition(OrderStatus::Delivered, OrderStatus::Pending),
            Err(MutationError::Conflict(_))
        ));
        assert!(matches!(
            check_transition(OrderStatus::Cancelled, OrderStatus::Shipped),
            Err(MutationError::Conflict(_))
        ));
        assert!(check_transition(OrderStatus::Delivered, OrderStatus::Delivered).is_ok());
    }
}
