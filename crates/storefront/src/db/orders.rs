//! Orders and their lines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use hearth_core::{
    Email, NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStatus, ProductId,
    ShippingAddress,
};

use super::{RepositoryError, money};

const ORDER_COLUMNS: &str =
    "SELECT id, user_email, total, status, shipping_address, created_at FROM orders";

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    user_email: String,
    total: Decimal,
    status: OrderStatus,
    shipping_address: Json<ShippingAddress>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: Option<String>,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid quantity {} on order item {}",
                row.quantity, row.id
            ))
        })?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity,
            price: money(row.price, "order item price")?,
        })
    }
}

fn into_order(row: OrderRow, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
    let user_email = Email::parse(&row.user_email)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;
    Ok(Order {
        id: row.id,
        user_email,
        total: money(row.total, "order total")?,
        status: row.status,
        shipping_address: row.shipping_address.0,
        created_at: row.created_at,
        items,
    })
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its lines in one transaction.
    ///
    /// The total is the sum of line totals at the captured prices. The
    /// order must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line references a missing product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let total = order.total();
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO orders (user_email, total, status, shipping_address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_email, total, status, shipping_address, created_at
            ",
        )
        .bind(order.user_email.as_str())
        .bind(total.amount())
        .bind(OrderStatus::Pending)
        .bind(Json(&order.shipping_address))
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity {} is out of range", line.quantity))
            })?;
            let id: OrderItemId = sqlx::query_scalar(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(row.id)
            .bind(line.id)
            .bind(quantity)
            .bind(line.price.amount())
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from_write)?;

            items.push(OrderItem {
                id,
                product_id: line.id,
                product_name: Some(line.name.clone()),
                quantity: line.quantity,
                price: line.price,
            });
        }

        tx.commit().await?;
        into_order(row, items)
    }

    /// Orders placed with `email`, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{ORDER_COLUMNS} WHERE user_email = $1 ORDER BY created_at DESC, id"
        ))
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;
        self.with_items(rows).await
    }

    /// Every order, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{ORDER_COLUMNS} ORDER BY created_at DESC, id"))
                .fetch_all(self.pool)
                .await?;
        self.with_items(rows).await
    }

    /// A single order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{ORDER_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.with_items(vec![row]).await?.pop())
    }

    async fn with_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id.as_uuid()).collect();
        let mut items = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                into_order(row, lines)
            })
            .collect()
    }

    async fn load_items(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
                   oi.quantity, oi.price
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }
}
