//! Hearth Core - Shared types library.
//!
//! This crate provides the types used across all Hearth components:
//! - `storefront` - Catalog facades, cart, checkout, and the public API
//! - `admin` - Catalog and order administration
//! - `cli` - Migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, ratings, slugs, emails, and statuses
//! - [`catalog`] - Categories, category tree assembly, products, filter criteria
//! - [`orders`] - Orders, reviews, cart and wishlist lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod orders;
pub mod types;

pub use catalog::*;
pub use orders::*;
pub use types::*;
