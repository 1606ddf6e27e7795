//! Storefront persistence against `PostgreSQL`.
//!
//! These tests require a migrated database at `DATABASE_URL`
//! (`cargo run -p hearth-cli -- migrate`). Every shopper is a fresh id.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sqlx::PgPool;

use hearth_core::{CartItem, Price, ProductId, UserId};
use hearth_integration_tests::{database_url, product};
use hearth_storefront::db::{PgCartStore, create_pool};
use hearth_storefront::session::{CartContext, CartStore};

async fn pool() -> PgPool {
    let url = database_url().expect("DATABASE_URL must be set for database tests");
    create_pool(&url).await.expect("Failed to connect to database")
}

fn line(n: u128, quantity: u32) -> CartItem {
    CartItem {
        id: ProductId::from_u128(n),
        name: format!("Item {n}"),
        price: Price::from_cents(1_250).unwrap(),
        image: String::new(),
        quantity,
    }
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (DATABASE_URL)"]
async fn test_cart_saves_for_shopper_without_profile() {
    let store = PgCartStore::new(pool().await);
    let shopper = UserId::generate();

    assert!(store.load(shopper).await.unwrap().is_none());

    store.save(shopper, &[line(1, 2)]).await.unwrap();
    let saved = store.load(shopper).await.unwrap().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].quantity, 2);

    store.save(shopper, &[line(1, 1), line(2, 3)]).await.unwrap();
    let replaced = store.load(shopper).await.unwrap().unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[1].quantity, 3);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (DATABASE_URL)"]
async fn test_first_sign_in_writes_through() {
    let pool = pool().await;
    let shopper = UserId::generate();

    let mut cart = CartContext::new(PgCartStore::new(pool.clone()));
    cart.add_item(&product(1, "Oak Chair", 12_900)).await;
    cart.sign_in(shopper).await;
    cart.add_item(&product(2, "Arc Lamp", 18_950)).await;

    let mut elsewhere = CartContext::new(PgCartStore::new(pool));
    elsewhere.sign_in(shopper).await;
    assert_eq!(elsewhere.item_count(), 2);
    assert_eq!(elsewhere.total(), Price::from_cents(31_850).unwrap());
}
