//! Sales analytics computed from fetched orders.
//!
//! Everything here is a pure function of the order rows and the product
//! count, so the dashboard figures can be tested without a database.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use hearth_core::{Email, Order, OrderId, OrderStatus, Price, ProductId};

/// How many entries the ranked lists keep.
pub const LEADERBOARD_SIZE: usize = 5;

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total_orders: usize,
    pub total_revenue: Price,
    /// Zero when there are no orders.
    pub average_order_value: Price,
    pub total_products: usize,
    pub top_products: Vec<TopProduct>,
    pub recent_orders: Vec<RecentOrder>,
}

/// A best seller, by units sold across every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub total_sold: u64,
    pub revenue: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub user_email: Email,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for RecentOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            user_email: order.user_email.clone(),
            total: order.total,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Summarize `orders` for the dashboard.
#[must_use]
pub fn summarize(orders: &[Order], total_products: usize) -> AnalyticsSummary {
    let total_orders = orders.len();
    let total_revenue: Price = orders.iter().map(|order| order.total).sum();

    AnalyticsSummary {
        total_orders,
        total_revenue,
        average_order_value: average(total_revenue, total_orders),
        total_products,
        top_products: top_products(orders),
        recent_orders: recent_orders(orders),
    }
}

fn average(total: Price, count: usize) -> Price {
    if count == 0 {
        return Price::ZERO;
    }
    let mean = (total.amount() / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Price::new(mean).unwrap_or(Price::ZERO)
}

fn top_products(orders: &[Order]) -> Vec<TopProduct> {
    let mut totals: HashMap<ProductId, TopProduct> = HashMap::new();

    for item in orders.iter().flat_map(|order| &order.items) {
        let entry = totals.entry(item.product_id).or_insert_with(|| TopProduct {
            product_id: item.product_id,
            name: item
                .product_name
                .clone()
                .unwrap_or_else(|| item.product_id.to_string()),
            total_sold: 0,
            revenue: Price::ZERO,
        });
        entry.total_sold += u64::from(item.quantity);
        entry.revenue = entry.revenue + item.line_total();
    }

    let mut ranked: Vec<TopProduct> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_sold
            .cmp(&a.total_sold)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(LEADERBOARD_SIZE);
    ranked
}

fn recent_orders(orders: &[Order]) -> Vec<RecentOrder> {
    let mut newest: Vec<&Order> = orders.iter().collect();
    newest.sort_by_key(|order| (Reverse(order.created_at), order.id));
    newest
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(RecentOrder::from)
        .collect()
}
