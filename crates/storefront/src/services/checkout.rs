//! Turning a cart into an order.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use hearth_core::{CartItem, Email, NewOrder, Order, ShippingAddress};

use crate::db::{OrderRepository, RepositoryError};

/// Checkout request as submitted by the shopper.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The submission cannot become an order as given.
    #[error("invalid order: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Validate a submission without touching the store.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` for a malformed email, an empty cart, a
/// zero quantity, or an incomplete shipping address.
pub fn prepare_order(request: CheckoutRequest) -> Result<NewOrder, CheckoutError> {
    let user_email =
        Email::parse(&request.email).map_err(|e| CheckoutError::Invalid(format!("email: {e}")))?;
    let order = NewOrder {
        user_email,
        shipping_address: request.shipping_address,
        items: request.items,
    };
    order
        .validate()
        .map_err(|e| CheckoutError::Invalid(e.to_string()))?;
    Ok(order)
}

/// Validate and persist an order, returning it as stored.
///
/// The cart is left alone; callers clear it once this succeeds.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` if validation fails and
/// `CheckoutError::Store` if the order could not be written.
#[instrument(skip_all, fields(lines = request.items.len()))]
pub async fn place_order(pool: &PgPool, request: CheckoutRequest) -> Result<Order, CheckoutError> {
    let order = prepare_order(request)?;
    let placed = OrderRepository::new(pool).create(&order).await?;
    info!(order_id = %placed.id, total = %placed.total, "Order placed");
    Ok(placed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_core::{Price, ProductId};

    use super::*;

    fn request(email: &str, quantities: &[u32]) -> CheckoutRequest {
        CheckoutRequest {
            email: email.to_string(),
            shipping_address: ShippingAddress {
                name: "Ada Lovelace".to_string(),
                address: "12 Analytical Row".to_string(),
                city: "London".to_string(),
                country: "UK".to_string(),
                postal_code: "W1".to_string(),
            },
            items: quantities
                .iter()
                .zip(1..)
                .map(|(&quantity, n)| CartItem {
                    id: ProductId::from_u128(n),
                    name: format!("Product {n}"),
                    price: Price::from_cents(1250).unwrap(),
                    image: String::new(),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_prepare_totals_lines() {
        let order = prepare_order(request("ada@example.com", &[2, 1])).unwrap();
        assert_eq!(order.total(), Price::from_cents(3750).unwrap());
    }

    #[test]
    fn test_rejects_empty_cart() {
        assert!(matches!(
            prepare_order(request("ada@example.com", &[])),
            Err(CheckoutError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_bad_email() {
        assert!(matches!(
            prepare_order(request("not-an-email", &[1])),
            Err(CheckoutError::Invalid(msg)) if msg.starts_with("email")
        ));
    }

    #[test]
    fn test_rejects_blank_address_field() {
        let mut req = request("ada@example.com", &[1]);
        req.shipping_address.city = "  ".to_string();
        let err = prepare_order(req).unwrap_err();
        assert_eq!(err.to_string(), "invalid order: city is required");
    }
}
