//! Product records.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, Rating};

/// A product row as stored.
///
/// Read-only for shoppers; created and edited through the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: Rating,
    /// Primary image URL.
    #[serde(default)]
    pub image: String,
    /// Gallery image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub color: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Catalog ordering: newest first, ties broken by id so the order is total.
#[must_use]
pub fn newest_first(a: &Product, b: &Product) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
