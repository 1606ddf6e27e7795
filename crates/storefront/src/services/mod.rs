//! Business logic that spans more than one repository.
//!
//! # Services
//!
//! - `checkout` - Validate a cart and persist it as an order

pub mod checkout;
