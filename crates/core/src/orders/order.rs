//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartItem, ValidationError, require};
use crate::types::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId};

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl ShippingAddress {
    /// Every field is required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("address", &self.address)?;
        require("city", &self.city)?;
        require("country", &self.country)?;
        require("postal_code", &self.postal_code)
    }
}

/// One line of a persisted order.
///
/// `price` is the unit price captured at checkout, not the current
/// catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    /// Product name at read time, when the product still exists.
    pub product_name: Option<String>,
    pub quantity: u32,
    pub price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A persisted order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_email: Email,
    pub total: Price,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// An order about to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_email: Email,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CartItem>,
}

impl NewOrder {
    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// An order needs at least one line, positive quantities, and a
    /// complete address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Invalid {
                field: "items",
                reason: "cart is empty".to_string(),
            });
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity == 0) {
            return Err(ValidationError::Invalid {
                field: "quantity",
                reason: format!("product {} has quantity 0", line.id),
            });
        }
        self.shipping_address.validate()
    }
}
