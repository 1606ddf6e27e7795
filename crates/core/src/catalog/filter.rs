//! Product filter criteria.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CategoryId, Price};

/// Optional predicates narrowing a product query.
///
/// Every field is independent. An absent field imposes no constraint, and
/// present fields combine by conjunction. Blank `query` and `color` values
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    pub color: Option<String>,
    pub in_stock: Option<bool>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn with_min_price(mut self, price: Price) -> Self {
        self.min_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_max_price(mut self, price: Price) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// Text query, if present and not blank. Returned as given.
    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }

    /// Color, if present and not blank. Returned as given.
    #[must_use]
    pub fn color_label(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// True when no field constrains the result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_query().is_none()
            && self.category_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.color_label().is_none()
            && self.in_stock.is_none()
    }

    /// Evaluate the criteria against a single product.
    ///
    /// Stores that cannot push the filter down use this directly; the
    /// PostgreSQL backend translates the same rules into SQL.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.text_query()
            && !product.name.to_lowercase().contains(&query.to_lowercase())
        {
            return false;
        }
        if let Some(category_id) = self.category_id
            && product.category_id != Some(category_id)
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        if let Some(color) = self.color_label()
            && product.color.as_deref() != Some(color)
        {
            return false;
        }
        if let Some(in_stock) = self.in_stock
            && product.in_stock != in_stock
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{ProductId, Rating};

    fn product(name: &str, cents: i64, color: Option<&str>, in_stock: bool) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Price::from_cents(cents).unwrap(),
            rating: Rating::default(),
            image: String::new(),
            images: Vec::new(),
            description: String::new(),
            category_id: None,
            color: color.map(str::to_string),
            in_stock,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_matches_everything() {
        let criteria = FilterCriteria::new();
        assert!(criteria.is_empty());
        assert!(criteria.matches(&product("Anything", 0, None, false)));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let criteria = FilterCriteria::new().with_query("  ").with_color("");
        assert!(criteria.is_empty());
        assert!(criteria.matches(&product("Sofa", 100, Some("red"), true)));
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let criteria = FilterCriteria::new().with_query("lamp");
        assert!(criteria.matches(&product("Desk LAMP", 100, None, true)));
        assert!(criteria.matches(&product("Lampshade", 100, None, true)));
        assert!(!criteria.matches(&product("Sofa", 100, None, true)));
    }

    #[test]
    fn test_query_whitespace_is_part_of_the_needle() {
        let criteria = FilterCriteria::new().with_query("a ");
        assert_eq!(criteria.text_query(), Some("a "));
        assert!(!criteria.matches(&product("Sofa", 100, None, true)));
        assert!(criteria.matches(&product("Sofa a bed", 100, None, true)));
    }

    #[test]
    fn test_color_is_not_trimmed() {
        let criteria = FilterCriteria::new().with_color("red ");
        assert!(!criteria.matches(&product("Rug", 100, Some("red"), true)));
        assert!(criteria.matches(&product("Rug", 100, Some("red "), true)));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let criteria = FilterCriteria::new()
            .with_min_price(Price::from_cents(1000).unwrap())
            .with_max_price(Price::from_cents(5000).unwrap());
        assert!(criteria.matches(&product("a", 1000, None, true)));
        assert!(criteria.matches(&product("b", 5000, None, true)));
        assert!(!criteria.matches(&product("c", 999, None, true)));
        assert!(!criteria.matches(&product("d", 5001, None, true)));
    }

    #[test]
    fn test_conjunction() {
        let criteria = FilterCriteria::new()
            .with_color("red")
            .with_in_stock(true);
        assert!(criteria.matches(&product("a", 1, Some("red"), true)));
        assert!(!criteria.matches(&product("b", 1, Some("red"), false)));
        assert!(!criteria.matches(&product("c", 1, Some("blue"), true)));
        assert!(!criteria.matches(&product("d", 1, None, true)));
    }

    #[test]
    fn test_category_exact_match() {
        let chairs = CategoryId::from_u128(2);
        let mut chair = product("Chair", 1, None, true);
        chair.category_id = Some(chairs);
        let criteria = FilterCriteria::new().with_category(chairs);
        assert!(criteria.matches(&chair));
        assert!(!criteria.matches(&product("Loose", 1, None, true)));
    }

    #[test]
    fn test_deserialize_partial() {
        let criteria: FilterCriteria = serde_json::from_str(r#"{"max_price": "50"}"#).unwrap();
        assert_eq!(criteria.max_price, Some(Price::from_cents(5000).unwrap()));
        assert!(criteria.query.is_none());
    }
}
