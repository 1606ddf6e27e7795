//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/admin/categories           - Flat category list
//! POST   /api/admin/categories           - Create category
//! PUT    /api/admin/categories/{id}      - Replace category
//! DELETE /api/admin/categories/{id}      - Delete category and subcategories
//!
//! GET    /api/admin/products             - Product list, newest first
//! POST   /api/admin/products             - Create product
//! PUT    /api/admin/products/{id}        - Replace product
//! DELETE /api/admin/products/{id}        - Delete product
//!
//! GET    /api/admin/orders               - Orders with lines, newest first
//! PUT    /api/admin/orders/{id}/status   - Change order status
//!
//! GET    /api/admin/analytics            - Sales summary
//! ```

pub mod analytics;
pub mod categories;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

/// Build the admin API router.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/orders", get(orders::list))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/analytics", get(analytics::summary));

    Router::new().nest("/api/admin", api)
}
