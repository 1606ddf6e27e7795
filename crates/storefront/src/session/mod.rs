//! Per-shopper session state: cart and wishlist.
//!
//! Each context is an explicit object owned by whoever serves the shopper.
//! They are created signed out, follow the shopper through
//! `sign_in`/`sign_out`, and never share state with each other.

pub mod cart;
pub mod memory;
pub mod wishlist;

use std::future::Future;
use std::sync::Arc;

use hearth_core::{CartItem, UserId};

use crate::db::RepositoryError;

pub use cart::CartContext;
pub use memory::InMemoryCartStore;
pub use wishlist::Wishlist;

/// Where signed-in carts are persisted.
pub trait CartStore: Send + Sync {
    /// The saved cart for `user`, or `None` if nothing has been saved yet.
    fn load(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<Vec<CartItem>>, RepositoryError>> + Send;

    /// Replace the saved cart for `user`.
    fn save(
        &self,
        user: UserId,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl<S: CartStore> CartStore for Arc<S> {
    fn load(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<Vec<CartItem>>, RepositoryError>> + Send {
        S::load(self, user)
    }

    fn save(
        &self,
        user: UserId,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        S::save(self, user, items)
    }
}
