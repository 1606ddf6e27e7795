//! Shopping cart context.

use hearth_core::{CartItem, Price, Product, ProductId, UserId};
use tracing::{debug, instrument, warn};

use super::CartStore;

/// A shopper's cart.
///
/// Signed out, the cart lives only in memory. Signed in, every change is
/// written through to the [`CartStore`]; a failed write is logged and the
/// local cart stays as it is.
pub struct CartContext<S> {
    store: S,
    user: Option<UserId>,
    items: Vec<CartItem>,
}

impl<S: CartStore> CartContext<S> {
    /// An empty, signed-out cart.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            user: None,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Attach the cart to `user`.
    ///
    /// A previously saved cart replaces whatever is in the cart now. With
    /// nothing saved, the current items are kept and saved for the user.
    #[instrument(skip(self))]
    pub async fn sign_in(&mut self, user: UserId) {
        self.user = Some(user);
        match self.store.load(user).await {
            Ok(Some(saved)) => {
                debug!(items = saved.len(), "Restored saved cart");
                self.items = saved;
            }
            Ok(None) => self.persist().await,
            Err(e) => warn!(error = %e, "Failed to load saved cart"),
        }
    }

    /// Detach from the user and empty the cart. Nothing is saved.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.items.clear();
    }

    /// Add one unit of `product`.
    pub async fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem {
                id: product.id,
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: 1,
            });
        }
        self.persist().await;
    }

    pub async fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|line| line.id != id);
        self.persist().await;
    }

    /// Set the quantity of a line. Zero removes it.
    pub async fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove_item(id).await;
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity;
        }
        self.persist().await;
    }

    pub async fn clear(&mut self) {
        self.items.clear();
        self.persist().await;
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Number of units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity))
    }

    async fn persist(&self) {
        let Some(user) = self.user else {
            return;
        };
        if let Err(e) = self.store.save(user, &self.items).await {
            warn!(%user, error = %e, "Failed to save cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use hearth_core::Rating;

    use super::*;
    use crate::session::InMemoryCartStore;

    fn product(n: u128, cents: i64) -> Product {
        Product {
            id: ProductId::from_u128(n),
            name: format!("Product {n}"),
            price: Price::from_cents(cents).unwrap(),
            rating: Rating::default(),
            image: format!("/img/{n}.jpg"),
            images: Vec::new(),
            description: String::new(),
            category_id: None,
            color: None,
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_increments_existing_line() {
        let mut cart = CartContext::new(InMemoryCartStore::new());
        let lamp = product(1, 2500);

        cart.add_item(&lamp).await;
        cart.add_item(&lamp).await;
        cart.add_item(&product(2, 1000)).await;

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items().first().unwrap().quantity, 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(6000).unwrap());
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_line() {
        let mut cart = CartContext::new(InMemoryCartStore::new());
        cart.add_item(&product(1, 100)).await;
        cart.update_quantity(ProductId::from_u128(1), 4).await;
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity(ProductId::from_u128(1), 0).await;
        assert!(cart.items().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[tokio::test]
    async fn test_quantities_saturate() {
        let mut cart = CartContext::new(InMemoryCartStore::new());
        let rug = product(1, 100);
        cart.add_item(&rug).await;
        cart.update_quantity(rug.id, u32::MAX).await;

        cart.add_item(&rug).await;
        assert_eq!(cart.items().first().unwrap().quantity, u32::MAX);

        cart.add_item(&product(2, 100)).await;
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[tokio::test]
    async fn test_signed_out_changes_are_not_saved() {
        let store = Arc::new(InMemoryCartStore::new());
        let mut cart = CartContext::new(Arc::clone(&store));
        cart.add_item(&product(1, 100)).await;
        assert!(store.saved(UserId::from_u128(7)).is_none());
    }

    #[tokio::test]
    async fn test_sign_in_restores_saved_cart() {
        let user = UserId::from_u128(7);
        let store = Arc::new(InMemoryCartStore::new());

        let mut first = CartContext::new(Arc::clone(&store));
        first.sign_in(user).await;
        first.add_item(&product(1, 100)).await;
        first.add_item(&product(1, 100)).await;

        let mut second = CartContext::new(Arc::clone(&store));
        second.add_item(&product(9, 100)).await;
        second.sign_in(user).await;

        assert_eq!(second.items().len(), 1);
        assert_eq!(second.items().first().unwrap().id, ProductId::from_u128(1));
        assert_eq!(second.item_count(), 2);
    }

    #[tokio::test]
    async fn test_sign_in_without_saved_cart_keeps_items() {
        let user = UserId::from_u128(8);
        let store = Arc::new(InMemoryCartStore::new());
        let mut cart = CartContext::new(Arc::clone(&store));
        cart.add_item(&product(3, 100)).await;

        cart.sign_in(user).await;

        assert_eq!(cart.item_count(), 1);
        assert_eq!(store.saved(user).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_without_saving() {
        let user = UserId::from_u128(7);
        let store = Arc::new(InMemoryCartStore::new());
        let mut cart = CartContext::new(Arc::clone(&store));
        cart.sign_in(user).await;
        cart.add_item(&product(1, 100)).await;

        cart.sign_out();

        assert!(cart.items().is_empty());
        assert_eq!(cart.user(), None);
        assert_eq!(store.saved(user).unwrap().len(), 1);
    }
}
