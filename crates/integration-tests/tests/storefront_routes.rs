//! Storefront JSON API driven through the router, over the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use hearth_integration_tests::{furniture_catalog, storefront_state};
use hearth_storefront::catalog::InMemoryCatalog;
use hearth_storefront::routes;
use hearth_storefront::state::AppState;

fn app(state: AppState<InMemoryCatalog>) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn names(body: &Value) -> Vec<&str> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_categories_endpoint_returns_nested_tree() {
    let (_, state) = storefront_state(furniture_catalog()).await;

    let (status, body) = get(app(state), "/api/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["categories"][0]["name"], "Furniture");
    assert_eq!(body["categories"][0]["subcategories"][0]["slug"], "chairs");
    assert_eq!(
        body["categories"][0]["subcategories"][0]["subcategories"][0]["name"],
        "Armchairs"
    );
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_products_without_filters_serve_live_list() {
    let (_, state) = storefront_state(furniture_catalog()).await;

    let (status, body) = get(app(state), "/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 5);
    assert!(body.get("criteria").is_none());
}

#[tokio::test]
async fn test_blank_parameters_count_as_absent() {
    let (_, state) = storefront_state(furniture_catalog()).await;

    let (status, body) = get(app(state), "/api/products?q=&category=&min_price=%20&in_stock=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 5);
    assert!(body.get("criteria").is_none());
}

#[tokio::test]
async fn test_max_price_filter() {
    let (_, state) = storefront_state(furniture_catalog()).await;

    let (status, body) = get(app(state), "/api/products?max_price=50").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Gift Card", "Desk Lamp"]);
    assert!(body["criteria"].is_object());
}

#[tokio::test]
async fn test_stock_and_text_filters() {
    let (_, state) = storefront_state(furniture_catalog()).await;
    let router = app(state);

    let (_, sold_out) = get(router.clone(), "/api/products?in_stock=false").await;
    assert_eq!(names(&sold_out), ["Desk Lamp"]);

    let (_, chairs) = get(router, "/api/products?q=chair").await;
    assert_eq!(names(&chairs), ["Velvet Armchair", "Oak Chair"]);
}

#[tokio::test]
async fn test_malformed_filters_are_rejected() {
    let (_, state) = storefront_state(furniture_catalog()).await;
    let router = app(state);

    let (status, body) = get(router.clone(), "/api/products?min_price=-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("min_price"));

    let (status, _) = get(router.clone(), "/api/products?category=chairs").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(router, "/api/products?in_stock=yes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("in_stock"));
}

#[tokio::test]
async fn test_failed_filter_reports_unavailable() {
    let (backend, state) = storefront_state(furniture_catalog()).await;
    backend.set_failing(true);

    let (status, body) = get(app(state), "/api/products?q=lamp").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "errored");
    assert!(body["products"].as_array().unwrap().is_empty());
    assert!(body["error"].as_str().unwrap().contains("products"));
}

#[tokio::test]
async fn test_order_routes_need_a_database() {
    let (_, state) = storefront_state(furniture_catalog()).await;
    let router = app(state);

    let (status, _) = get(router.clone(), "/api/orders?email=ada@example.com").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get(router.clone(), "/api/orders?email=not-an-email").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let checkout = json!({
        "email": "ada@example.com",
        "shipping_address": {
            "name": "Ada", "address": "1 Loom Lane", "city": "London",
            "country": "UK", "postal_code": "N1"
        },
        "items": []
    });
    let request = Request::post("/api/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(checkout.to_string()))
        .unwrap();
    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service unavailable");

    let (status, _) = get(
        router,
        "/api/products/00000000-0000-0000-0000-000000000001/reviews",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
