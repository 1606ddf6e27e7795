//! Saved-for-later list. Memory only.

use hearth_core::{ProductId, WishlistItem};

#[derive(Debug, Clone, Default)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `item` unless a product with the same id is already saved.
    /// Returns whether the list changed.
    pub fn add_item(&mut self, item: WishlistItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|item| item.id != id);
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    /// The wishlist does not outlive a session.
    pub fn sign_out(&mut self) {
        self.clear();
    }
}
