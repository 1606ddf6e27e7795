//! Product route handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use hearth_core::{CategoryId, FilterCriteria, Price};

use crate::catalog::{CatalogBackend, LoadState, ProductCatalog, ProductSnapshot};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query string for `GET /api/products`. Blank values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub color: Option<String>,
    pub in_stock: Option<String>,
}

impl ProductQuery {
    /// Validate and convert to filter criteria.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed category id, price, or
    /// stock flag.
    pub fn into_criteria(self) -> Result<FilterCriteria> {
        let category_id = present(self.category.as_deref())
            .map(|raw| {
                CategoryId::from_str(raw)
                    .map_err(|e| AppError::BadRequest(format!("category: {e}")))
            })
            .transpose()?;

        Ok(FilterCriteria {
            query: self.q,
            category_id,
            min_price: parse_price("min_price", self.min_price.as_deref())?,
            max_price: parse_price("max_price", self.max_price.as_deref())?,
            color: self.color,
            in_stock: parse_flag("in_stock", self.in_stock.as_deref())?,
        })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_price(field: &str, raw: Option<&str>) -> Result<Option<Price>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    let amount = Decimal::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("{field}: {e}")))?;
    Price::new(amount)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("{field}: {e}")))
}

fn parse_flag(field: &str, raw: Option<&str>) -> Result<Option<bool>> {
    match present(raw) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(AppError::BadRequest(format!(
            "{field}: expected true or false, got '{other}'"
        ))),
    }
}

/// List products.
///
/// Without filters this is the live list held in state. With any filter a
/// fresh query runs for this request alone, so concurrent shoppers never
/// see each other's results.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the query string is malformed.
pub async fn list<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Query(query): Query<ProductQuery>,
) -> Result<(StatusCode, Json<ProductSnapshot>)> {
    let criteria = query.into_criteria()?;

    let snapshot = if criteria.is_empty() {
        state.products().snapshot().await
    } else {
        let catalog = ProductCatalog::new(Arc::clone(state.backend()));
        catalog.filter(criteria).await;
        catalog.snapshot().await
    };

    let status = if snapshot.status == LoadState::Errored {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    Ok((status, Json(snapshot)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_parameters_are_absent() {
        let query = ProductQuery {
            q: Some("  ".to_string()),
            category: Some(String::new()),
            min_price: Some(" ".to_string()),
            in_stock: Some(String::new()),
            ..ProductQuery::default()
        };
        assert!(query.into_criteria().unwrap().is_empty());
    }

    #[test]
    fn test_prices_parse() {
        let query = ProductQuery {
            min_price: Some("10".to_string()),
            max_price: Some("49.99".to_string()),
            ..ProductQuery::default()
        };
        let criteria = query.into_criteria().unwrap();
        assert_eq!(criteria.min_price, Some(Price::from_cents(1000).unwrap()));
        assert_eq!(criteria.max_price, Some(Price::from_cents(4999).unwrap()));
    }

    #[test]
    fn test_rejects_negative_or_garbage_price() {
        let negative = ProductQuery {
            min_price: Some("-1".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(
            negative.into_criteria(),
            Err(AppError::BadRequest(_))
        ));

        let garbage = ProductQuery {
            max_price: Some("cheap".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(garbage.into_criteria(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_stock_flag() {
        let sold_out = ProductQuery {
            in_stock: Some("false".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(sold_out.into_criteria().unwrap().in_stock, Some(false));

        let garbage = ProductQuery {
            in_stock: Some("maybe".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(garbage.into_criteria(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_bad_category() {
        let query = ProductQuery {
            category: Some("chairs".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(query.into_criteria(), Err(AppError::BadRequest(_))));
    }
}
