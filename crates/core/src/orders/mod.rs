//! Orders, order lines, reviews, and cart lines.
//!
//! These are the payloads that cross the store boundary during checkout,
//! order history, and review submission. Each has its required fields
//! spelled out and a `validate` step that runs before anything is written.

pub mod cart;
pub mod order;
pub mod review;

pub use cart::{CartItem, WishlistItem};
pub use order::{NewOrder, Order, OrderItem, ShippingAddress};
pub use review::{NewReview, Review};

/// A payload failed validation before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was blank.
    #[error("{0} is required")]
    Missing(&'static str),
    /// A field was present but out of range or malformed.
    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Require a non-blank text field.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}
