//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check (in main)
//! GET  /health/ready               - Readiness check (in main)
//!
//! # Catalog
//! GET  /api/categories             - Live category tree
//! GET  /api/products               - Live product list, or a filtered query
//!
//! # Reviews
//! GET  /api/products/{id}/reviews  - Reviews for a product, newest first
//! POST /api/products/{id}/reviews  - Submit a review
//!
//! # Orders
//! POST /api/checkout               - Place an order
//! GET  /api/orders?email=          - Order history for an email
//! ```

pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    routing::{get, post},
};

use crate::catalog::CatalogBackend;
use crate::state::AppState;

/// Create the storefront API router.
pub fn routes<B: CatalogBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/api/categories", get(categories::list::<B>))
        .route("/api/products", get(products::list::<B>))
        .route(
            "/api/products/{id}/reviews",
            get(reviews::list::<B>).post(reviews::create::<B>),
        )
        .route("/api/checkout", post(checkout::place::<B>))
        .route("/api/orders", get(orders::list::<B>))
}
