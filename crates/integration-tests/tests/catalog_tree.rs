//! Live category tree over the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use hearth_integration_tests::{
    category, category_id, eventually, furniture_catalog, storefront_state,
};
use hearth_storefront::catalog::{CategoryTree, LoadState, Table};

#[tokio::test]
async fn test_tree_nests_three_levels() {
    let tree = CategoryTree::new(Arc::new(furniture_catalog()));
    assert_eq!(tree.refresh().await, LoadState::Ready);

    let roots = tree.categories().await;
    let names: Vec<&str> = roots.iter().map(|n| n.category.name.as_str()).collect();
    assert_eq!(names, ["Furniture", "Lighting"]);

    let chairs = &roots[0].subcategories[0];
    assert_eq!(chairs.category.name, "Chairs");
    assert_eq!(chairs.subcategories[0].category.name, "Armchairs");
    assert!(roots[1].subcategories.is_empty());
}

#[tokio::test]
async fn test_new_category_appears_without_refresh() {
    let (backend, state) = storefront_state(furniture_catalog()).await;
    let tree = state.categories();

    backend.insert_category(category(5, "Floor Lamps", Some(4)));

    let appeared = eventually(|| async move {
        tree.categories()
            .await
            .iter()
            .any(|root| root.find(category_id(5)).is_some())
    })
    .await;
    assert!(appeared, "subscription should reload the tree");

    let roots = tree.categories().await;
    let lighting = roots.iter().find(|r| r.category.name == "Lighting").unwrap();
    assert_eq!(lighting.subcategories[0].category.slug.as_str(), "floor-lamps");
}

#[tokio::test]
async fn test_deleting_parent_removes_subtree_and_uncategorizes_products() {
    let (backend, state) = storefront_state(furniture_catalog()).await;
    let tree = state.categories();
    let products = state.products();

    assert!(backend.remove_category(category_id(2)));

    let pruned = eventually(|| async move {
        let roots = tree.categories().await;
        roots.iter().all(|root| root.find(category_id(3)).is_none())
            && roots.iter().any(|root| root.id() == category_id(1))
    })
    .await;
    assert!(pruned);

    let uncategorized = eventually(|| async move {
        products
            .products()
            .await
            .iter()
            .filter(|p| p.category_id.is_none())
            .count()
            == 3
    })
    .await;
    assert!(
        uncategorized,
        "Oak Chair, Velvet Armchair and Gift Card lose their category"
    );
}

#[tokio::test]
async fn test_orphan_never_shown() {
    let (backend, state) = storefront_state(furniture_catalog()).await;
    let tree = state.categories();

    backend.insert_category(category(9, "Orphan", Some(99)));
    backend.insert_category(category(10, "Bedroom", None));

    // Bedroom arriving proves the reload that also saw the orphan finished
    let bedroom = eventually(|| async move {
        tree.categories()
            .await
            .iter()
            .any(|r| r.id() == category_id(10))
    })
    .await;
    assert!(bedroom);

    let snapshot = tree.snapshot().await;
    assert_eq!(snapshot.status, LoadState::Ready);
    assert!(
        snapshot
            .categories
            .iter()
            .all(|root| root.find(category_id(9)).is_none())
    );
}

#[tokio::test]
async fn test_failed_reload_clears_tree_until_store_recovers() {
    let (backend, state) = storefront_state(furniture_catalog()).await;
    let tree = state.categories();
    assert_eq!(tree.status().await, LoadState::Ready);

    backend.set_failing(true);
    backend.notify(Table::Categories);
    assert!(eventually(|| async move { tree.status().await == LoadState::Errored }).await);
    let snapshot = tree.snapshot().await;
    assert!(snapshot.categories.is_empty());
    assert!(snapshot.error.is_some());

    backend.set_failing(false);
    backend.notify(Table::Categories);
    assert!(eventually(|| async move { tree.status().await == LoadState::Ready }).await);
    assert_eq!(tree.categories().await.len(), 2);
}
