//! Handler tests for checkout and reporting: status codes and JSON shapes.
//!
//! Backed by the in-memory repositories so they run without Docker.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_categories::InMemoryCategoryRepository;
use domain_products::{InMemoryProductRepository, ProductInput, ProductRepository};
use domain_transactions::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use utoipa::OpenApi;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Product 1 = A (1000, stock 5), product 2 = B (500, stock 10).
async fn app() -> (axum::Router, InMemoryProductRepository) {
    let products = InMemoryProductRepository::new(InMemoryCategoryRepository::new());
    for (name, price, stock) in [("A", 1000, 5), ("B", 500, 10)] {
        products
            .create(ProductInput {
                name: name.into(),
                price,
                stock,
                categories: vec![],
            })
            .await
            .unwrap();
    }

    let service = TransactionService::new(InMemoryTransactionRepository::new(products.clone()));
    (handlers::router(service), products)
}

#[tokio::test]
async fn test_checkout_returns_201_with_transaction() {
    let (app, products) = app().await;

    let response = app
        .oneshot(post_json(
            "/checkout",
            json!({"items": [{"product_id": 1, "quantity": 2}, {"product_id": 2, "quantity": 3}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction: Transaction = json_body(response.into_body()).await;
    assert_eq!(transaction.total_amount, 3500);
    assert_eq!(transaction.details.len(), 2);
    assert_eq!(transaction.details[1].product_name, "B");

    assert_eq!(products.get_by_id(1).await.unwrap().unwrap().stock, 3);
    assert_eq!(products.get_by_id(2).await.unwrap().unwrap().stock, 7);
}

#[test]
fn test_checkout_docs_advertise_201() {
    let doc = ApiDoc::openapi();
    let operation = doc.paths.paths["/checkout"].post.as_ref().unwrap();

    assert!(operation.responses.responses.contains_key("201"));
    assert!(!operation.responses.responses.contains_key("200"));
    assert!(
        operation
            .description
            .as_deref()
            .is_some_and(|d| d.contains("201 Created"))
    );
}

#[tokio::test]
async fn test_checkout_unknown_product_returns_404() {
    let (app, products) = app().await;

    let response = app
        .oneshot(post_json(
            "/checkout",
            json!({"items": [{"product_id": 1, "quantity": 2}, {"product_id": 3, "quantity": 1}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "Product 3 not found");
    assert_eq!(products.get_by_id(1).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
async fn test_checkout_oversell_returns_409() {
    let (app, _) = app().await;

    let response = app
        .oneshot(post_json("/checkout", json!({"items": [{"product_id": 1, "quantity": 6}]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "CONFLICT");
}

#[tokio::test]
async fn test_checkout_rejects_empty_items_and_zero_quantity() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(post_json("/checkout", json!({"items": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/checkout", json!({"items": [{"product_id": 1, "quantity": 0}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_transaction_by_id() {
    let (app, _) = app().await;

    app.clone()
        .oneshot(post_json("/checkout", json!({"items": [{"product_id": 2, "quantity": 1}]})))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/transactions/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let transaction: Transaction = json_body(response.into_body()).await;
    assert_eq!(transaction.total_amount, 500);

    let response = app.oneshot(get("/transactions/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_transactions_respects_limit() {
    let (app, _) = app().await;
    for _ in 0..3 {
        app.clone()
            .oneshot(post_json("/checkout", json!({"items": [{"product_id": 2, "quantity": 1}]})))
            .await
            .unwrap();
    }

    let response = app.oneshot(get("/transactions?limit=2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let transactions: Vec<Transaction> = json_body(response.into_body()).await;
    assert_eq!(transactions.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2]);
}

#[tokio::test]
async fn test_today_report_without_sales_is_zero() {
    let (app, _) = app().await;

    let response = app.oneshot(get("/report/hari-ini")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(
        report,
        json!({"total_revenue": 0, "total_transactions": 0, "best_selling_product": null})
    );
}

#[tokio::test]
async fn test_report_for_today_sums_checkouts() {
    let (app, _) = app().await;
    for body in [
        json!({"items": [{"product_id": 1, "quantity": 2}, {"product_id": 2, "quantity": 3}]}),
        json!({"items": [{"product_id": 2, "quantity": 3}]}),
    ] {
        app.clone().oneshot(post_json("/checkout", body)).await.unwrap();
    }

    let response = app.oneshot(get("/report")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report: Report = json_body(response.into_body()).await;
    assert_eq!(report.total_revenue, 5000);
    assert_eq!(report.total_transactions, 3);
    assert_eq!(report.best_selling_product.unwrap().name, "B");
}

#[tokio::test]
async fn test_report_rejects_bad_dates() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(get("/report?start_date=2024-05-10&end_date=2024-05-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/report?end_date=01-05-2024")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert!(error.message.contains("end_date"));
}
