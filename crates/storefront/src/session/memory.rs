//! Cart store kept in process memory.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use hearth_core::{CartItem, UserId};

use super::CartStore;
use crate::db::RepositoryError;

#[derive(Default)]
pub struct InMemoryCartStore {
    carts: Mutex<HashMap<UserId, Vec<CartItem>>>,
}

impl InMemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The saved cart for `user`, bypassing the trait.
    #[must_use]
    pub fn saved(&self, user: UserId) -> Option<Vec<CartItem>> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .cloned()
    }
}

impl CartStore for InMemoryCartStore {
    async fn load(&self, user: UserId) -> Result<Option<Vec<CartItem>>, RepositoryError> {
        Ok(self.saved(user))
    }

    async fn save(&self, user: UserId, items: &[CartItem]) -> Result<(), RepositoryError> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, items.to_vec());
        Ok(())
    }
}
